use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Static access key pair for S3-compatible test doubles (LocalStack, MinIO).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key: String,
    pub secret_key: String,
}

/// Gateway configuration, fixed at startup
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Target bucket for every operation
    pub bucket: String,

    /// AWS region (default: "us-east-1")
    pub region: String,

    /// Custom S3 endpoint. `None` means the real AWS endpoint for `region`.
    pub endpoint_url: Option<String>,

    /// Static credentials. `None` falls back to the default AWS provider
    /// chain (environment, profile, instance role).
    pub credentials: Option<StaticCredentials>,

    /// Path-style addressing, required by most local S3 emulators
    pub force_path_style: bool,

    /// Create the bucket at startup when a HEAD on it fails (default: false)
    pub create_bucket_if_missing: bool,

    /// Local directory for in-flight uploads (default: "./uploads")
    pub staging_dir: PathBuf,

    /// Listening port (default: 3000)
    pub port: u16,

    /// Validity window of download grants (default: 60 seconds)
    pub signed_url_ttl: Duration,

    /// Maximum upload size in bytes (default: 1 GB)
    pub max_file_size: usize,

    /// Follow continuation tokens when listing (default: false, first page only)
    pub list_all_pages: bool,

    /// Allowed CORS origins. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl GatewayConfig {
    pub const DEFAULT_REGION: &'static str = "us-east-1";
    pub const DEFAULT_STAGING_DIR: &'static str = "./uploads";
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 60;
    pub const DEFAULT_MAX_FILE_SIZE: usize = 1024 * 1024 * 1024; // 1 GB

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let flag = |key: &str| var(key).map(|v| v.to_lowercase() == "true" || v == "1");

        let Some(bucket) = var("S3_BUCKET") else {
            bail!("S3_BUCKET must be set");
        };

        let endpoint_url = var("S3_ENDPOINT");

        let credentials = match (var("S3_ACCESS_KEY"), var("S3_SECRET_KEY")) {
            (Some(access_key), Some(secret_key)) => Some(StaticCredentials {
                access_key,
                secret_key,
            }),
            (None, None) => None,
            _ => bail!("S3_ACCESS_KEY and S3_SECRET_KEY must be set together"),
        };

        let parsed = |key: &str| -> Result<Option<u64>> {
            var(key)
                .map(|v| {
                    v.parse::<u64>()
                        .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, v, e))
                })
                .transpose()
        };

        let signed_url_ttl_secs =
            parsed("SIGNED_URL_TTL_SECS")?.unwrap_or(Self::DEFAULT_SIGNED_URL_TTL_SECS);
        if signed_url_ttl_secs == 0 {
            bail!("SIGNED_URL_TTL_SECS must be greater than zero");
        }

        let port = match parsed("PORT")? {
            Some(port) => u16::try_from(port)
                .map_err(|_| anyhow::anyhow!("Invalid PORT '{}': out of range", port))?,
            None => Self::DEFAULT_PORT,
        };

        let max_file_size = match parsed("MAX_FILE_SIZE")? {
            Some(size) => usize::try_from(size)
                .map_err(|_| anyhow::anyhow!("Invalid MAX_FILE_SIZE '{}': out of range", size))?,
            None => Self::DEFAULT_MAX_FILE_SIZE,
        };

        Ok(Self {
            bucket,
            region: var("AWS_REGION").unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
            force_path_style: flag("S3_FORCE_PATH_STYLE").unwrap_or(endpoint_url.is_some()),
            endpoint_url,
            credentials,
            create_bucket_if_missing: flag("S3_CREATE_BUCKET").unwrap_or(false),
            staging_dir: var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_STAGING_DIR)),
            port,
            signed_url_ttl: Duration::from_secs(signed_url_ttl_secs),
            max_file_size,
            list_all_pages: flag("LIST_ALL_PAGES").unwrap_or(false),
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Create config for local development and tests
    pub fn development(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: Self::DEFAULT_REGION.to_string(),
            endpoint_url: None,
            credentials: None,
            force_path_style: false,
            create_bucket_if_missing: false,
            staging_dir: PathBuf::from(Self::DEFAULT_STAGING_DIR),
            port: Self::DEFAULT_PORT,
            signed_url_ttl: Duration::from_secs(Self::DEFAULT_SIGNED_URL_TTL_SECS),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            list_all_pages: false,
            allowed_origins: Vec::new(),
        }
    }
}
