//! Durable object storage for resolved assets.

use async_trait::async_trait;
use log::debug;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use crate::config::StorageConfig;
use crate::error::SyncError;

/// Binary object storage. Uploading yields the stable public URL the
/// published record points at.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        data: &[u8],
        key: &str,
        bucket: &str,
        content_type: &str,
    ) -> Result<String, SyncError>;
}

/// S3-backed object storage. Objects are publicly reachable under
/// `https://{bucket}.{public_domain}/{key}`.
pub struct S3Storage {
    credentials: Credentials,
    region: Region,
    public_domain: String,
}

impl S3Storage {
    /// Create a new storage client from configuration. Both credentials
    /// are required; a missing one is a startup error.
    pub fn new(config: &StorageConfig) -> Result<Self, SyncError> {
        let access_key = config
            .access_key
            .as_deref()
            .ok_or(SyncError::MissingCredential("storage.access_key"))?;
        let secret_key = config
            .secret_key
            .as_deref()
            .ok_or(SyncError::MissingCredential("storage.secret_key"))?;

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| SyncError::Storage(e.to_string()))?;
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: format!("https://s3.{}.amazonaws.com", config.region),
        };

        Ok(S3Storage {
            credentials,
            region,
            public_domain: config.public_domain.clone(),
        })
    }

    /// Public URL of an object, a pure function of bucket and key.
    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://{}.{}/{}", bucket, self.public_domain, key)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        data: &[u8],
        key: &str,
        bucket: &str,
        content_type: &str,
    ) -> Result<String, SyncError> {
        let handle = Bucket::new(bucket, self.region.clone(), self.credentials.clone())
            .map_err(|e| SyncError::Storage(e.to_string()))?;

        let response = handle
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| SyncError::Storage(e.to_string()))?;
        if response.status_code() >= 300 {
            return Err(SyncError::Storage(format!(
                "upload of {} to bucket {} returned status {}",
                key,
                bucket,
                response.status_code()
            )));
        }

        debug!("Uploaded {key} to bucket {bucket}");
        Ok(self.public_url(bucket, key))
    }
}
