//! S3-compatible object storage backend.
//!
//! Works against AWS S3 and S3-compatible services (MinIO, R2, Spaces) via
//! a custom endpoint and path-style addressing.

use async_trait::async_trait;
use tracing::{debug, error, info};

use super::{ObjectStore, UploadError};
use crate::config::S3StorageConfig;

pub struct S3ObjectStore {
    config: S3StorageConfig,
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub async fn new(config: S3StorageConfig) -> Result<Self, UploadError> {
        info!(bucket = %config.bucket, "Initializing S3 archive storage");

        let mut sdk_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            sdk_config_builder = sdk_config_builder.region(aws_config::Region::new(region.clone()));
        }

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = aws_credential_types::Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None, // session token
                None, // expiry
                "mailsweep-config",
            );
            sdk_config_builder = sdk_config_builder.credentials_provider(credentials);
        }

        let sdk_config = sdk_config_builder.load().await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = aws_sdk_s3::Client::from_conf(s3_config_builder.build());

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, content: &[u8]) -> Result<(), UploadError> {
        let object_key = self.config.object_key(key);
        debug!(key = %object_key, size = content.len(), "Uploading archive to S3");

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&object_key)
            .content_type("text/csv")
            .body(aws_sdk_s3::primitives::ByteStream::from(content.to_vec()))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %object_key, "Failed to upload archive to S3");
                UploadError::S3(e.to_string())
            })?;

        info!(key = %object_key, bucket = %self.config.bucket, "Archive uploaded");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
