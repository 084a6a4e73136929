//! External image catalog lookups (Unsplash).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::UnsplashConfig;
use crate::error::SyncError;
use crate::http::{build_client, send_with_retry};

/// The rendition size editorial images are published in.
pub const SIZE_REGULAR: &str = "regular";

/// Hosted photo lookup plus plain binary fetch.
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// Resolve the hosted URL of a photo at the given size.
    async fn photo_url(&self, photo_id: &str, size: &str) -> Result<String, SyncError>;

    /// Fetch binary content from a public URL.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, SyncError>;
}

/// Client for the Unsplash photo API. The access key is optional at
/// construction and only checked on the first lookup, so runs that never
/// touch an editorial image need no catalog credential.
pub struct UnsplashCatalog {
    client: Client,
    base_url: String,
    access_key: Option<String>,
}

impl UnsplashCatalog {
    pub fn new(config: &UnsplashConfig, timeout_secs: u64) -> Self {
        UnsplashCatalog {
            client: build_client(timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
        }
    }
}

#[async_trait]
impl ImageCatalog for UnsplashCatalog {
    async fn photo_url(&self, photo_id: &str, size: &str) -> Result<String, SyncError> {
        let access_key = self
            .access_key
            .as_deref()
            .ok_or(SyncError::MissingCredential("unsplash.access_key"))?;

        let url = format!("{}/photos/{}", self.base_url, photo_id);
        let response =
            send_with_retry(self.client.get(&url).query(&[("client_id", access_key)])).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Catalog {
                status: status.as_u16(),
                message,
            });
        }

        let data: Value = response.json().await?;
        data.get("urls")
            .and_then(|urls| urls.get(size))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SyncError::MissingRendition {
                id: photo_id.to_string(),
                size: size.to_string(),
            })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, SyncError> {
        let response = send_with_retry(self.client.get(url)).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Catalog {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
