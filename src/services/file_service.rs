use crate::config::GatewayConfig;
use crate::services::staging::{StagedUpload, StagingArea};
use crate::services::storage::{StorageService, StoredObject};
use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

/// Ingest, enumerate and retrieve on top of a [`StorageService`].
pub struct FileService {
    storage: Arc<dyn StorageService>,
    staging: StagingArea,
    signed_url_ttl: Duration,
    list_all_pages: bool,
}

impl FileService {
    pub fn new(storage: Arc<dyn StorageService>, config: &GatewayConfig) -> Self {
        Self {
            storage,
            staging: StagingArea::new(config.staging_dir.clone()),
            signed_url_ttl: config.signed_url_ttl,
            list_all_pages: config.list_all_pages,
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub async fn upload_to_staging<R>(&self, reader: R) -> Result<StagedUpload>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.staging.stage(reader).await
    }

    /// Push a staged upload to the bucket under `key`, then remove the
    /// staging file. The key is the client file name, unmodified; an existing
    /// object with that key is overwritten.
    pub async fn process_upload(
        &self,
        staged: StagedUpload,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<()> {
        let content_length = i64::try_from(staged.size()).context("Upload too large")?;
        let body = ByteStream::from_path(staged.path())
            .await
            .context("Failed to open staging file")?;

        tracing::info!("⬆️  Uploading '{}' ({} bytes)", key, content_length);
        self.storage
            .put_object(key, body, content_length, content_type)
            .await
            .with_context(|| format!("put_object failed for key '{}'", key))?;

        staged.close()?;
        Ok(())
    }

    /// List the bucket. Only the first page is returned unless the service was
    /// configured to follow continuation tokens.
    pub async fn list_objects(&self) -> Result<Vec<StoredObject>> {
        let mut page = self.storage.list_objects_page(None).await?;
        let mut objects = std::mem::take(&mut page.objects);

        while let Some(token) = page.next_continuation_token.take() {
            if !self.list_all_pages {
                tracing::warn!(
                    "Bucket listing truncated at {} objects (LIST_ALL_PAGES disabled)",
                    objects.len()
                );
                break;
            }
            page = self.storage.list_objects_page(Some(token)).await?;
            objects.append(&mut page.objects);
        }

        Ok(objects)
    }

    /// Time-limited GET URL for `key`. The key is not checked for existence.
    pub async fn download_url(&self, key: &str) -> Result<String> {
        self.storage
            .presigned_get_url(key, self.signed_url_ttl)
            .await
            .with_context(|| format!("Failed to presign key '{}'", key))
    }
}
