use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;

/// One entry of a bucket listing, in the shape S3 reports it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct StoredObject {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl StoredObject {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            last_modified: None,
            e_tag: None,
            size: None,
            storage_class: None,
        }
    }

    fn from_s3(object: aws_sdk_s3::types::Object) -> Option<Self> {
        let key = object.key?;
        let last_modified = object.last_modified.map(|d| {
            DateTime::from_timestamp(d.secs(), d.subsec_nanos()).unwrap_or_default()
        });

        Some(Self {
            key,
            last_modified,
            e_tag: object.e_tag,
            size: object.size,
            storage_class: object.storage_class.map(|c| c.as_str().to_string()),
        })
    }
}

/// A single page of a bucket listing.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<StoredObject>,
    /// Present when the backend truncated the listing.
    pub next_continuation_token: Option<String>,
}

/// Object-storage capability used by the gateway. Implementations are bound
/// to a single bucket; keys are passed through as opaque strings.
#[async_trait]
pub trait StorageService: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: ByteStream,
        content_length: i64,
        content_type: Option<&str>,
    ) -> Result<()>;
    async fn list_objects_page(&self, continuation_token: Option<String>) -> Result<ObjectPage>;
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> Result<String>;
    async fn check_bucket(&self) -> Result<()>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn put_object(
        &self,
        key: &str,
        body: ByteStream,
        content_length: i64,
        content_type: Option<&str>,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_length(content_length)
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await?;
        Ok(())
    }

    async fn list_objects_page(&self, continuation_token: Option<String>) -> Result<ObjectPage> {
        let res = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_continuation_token(continuation_token)
            .send()
            .await?;

        let objects = res
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(StoredObject::from_s3)
            .collect();

        let next_continuation_token = if res.is_truncated.unwrap_or(false) {
            res.next_continuation_token
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await?;
        Ok(request.uri().to_string())
    }

    async fn check_bucket(&self) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await?;
        Ok(())
    }
}
