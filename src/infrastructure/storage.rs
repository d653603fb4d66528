use crate::config::GatewayConfig;
use crate::services::storage::S3StorageService;
use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use std::sync::Arc;
use tracing::{error, info};

pub async fn setup_storage(config: &GatewayConfig) -> Result<Arc<S3StorageService>> {
    info!(
        "☁️  S3 Storage: {} (Bucket: {}, Region: {})",
        config.endpoint_url.as_deref().unwrap_or("aws"),
        config.bucket,
        config.region
    );

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    if let Some(creds) = &config.credentials {
        loader = loader.credentials_provider(Credentials::new(
            creds.access_key.clone(),
            creds.secret_key.clone(),
            None,
            None,
            "static",
        ));
    }

    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.force_path_style)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    if config.create_bucket_if_missing {
        ensure_bucket(&s3_client, &config.bucket, &config.region).await?;
    }

    Ok(Arc::new(S3StorageService::new(s3_client, config.bucket.clone())))
}

async fn ensure_bucket(client: &aws_sdk_s3::Client, bucket: &str, region: &str) -> Result<()> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", bucket);
            let mut request = client.create_bucket().bucket(bucket);
            // us-east-1 rejects an explicit location constraint
            if region != GatewayConfig::DEFAULT_REGION {
                request = request.create_bucket_configuration(
                    CreateBucketConfiguration::builder()
                        .location_constraint(BucketLocationConstraint::from(region))
                        .build(),
                );
            }
            request
                .send()
                .await
                .inspect_err(|e| error!("❌ Failed to create bucket '{}': {}", bucket, e))
                .with_context(|| format!("Failed to create bucket '{}'", bucket))?;
            info!("✅ Bucket '{}' created successfully", bucket);
        }
    }
    Ok(())
}
