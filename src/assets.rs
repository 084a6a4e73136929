//! Resolution of editorial images and sharepics into durable public URLs.
//!
//! Both flows share one shape: fetch the bytes from wherever they live,
//! re-upload them under a deterministic key, and hand back the public URL.
//! Every failure degrades to an empty URL; a card never fails over its
//! artwork.

use log::warn;

use crate::board::Board;
use crate::catalog::{ImageCatalog, SIZE_REGULAR};
use crate::error::SyncError;
use crate::storage::ObjectStorage;

/// Wires the catalog, the board and object storage together for per-card
/// asset resolution.
pub struct AssetResolver<'a> {
    pub catalog: &'a dyn ImageCatalog,
    pub storage: &'a dyn ObjectStorage,
    pub board: &'a dyn Board,
    pub image_bucket: &'a str,
    pub sharepic_bucket: &'a str,
}

impl AssetResolver<'_> {
    /// Resolve an editorial image reference to a durable URL. An empty
    /// reference means the card has no image and is not an error.
    pub async fn editorial_image_url(&self, image_id: &str) -> String {
        if image_id.is_empty() {
            return String::new();
        }
        match self.resolve_image(image_id).await {
            Ok(url) => url,
            Err(err) => {
                warn!("Could not resolve image {image_id}: {err}");
                String::new()
            }
        }
    }

    async fn resolve_image(&self, image_id: &str) -> Result<String, SyncError> {
        let hosted = self.catalog.photo_url(image_id, SIZE_REGULAR).await?;
        let bytes = self.catalog.fetch_bytes(&hosted).await?;
        self.storage
            .put_object(&bytes, &format!("{image_id}.jpg"), self.image_bucket, "image/jpeg")
            .await
    }

    /// Resolve a sharepic attachment to a durable URL, keyed by the card's
    /// slug. No attachment means no sharepic and is not an error.
    pub async fn sharepic_url(&self, attachment_url: Option<&str>, slug: &str) -> String {
        let Some(url) = attachment_url else {
            return String::new();
        };
        match self.resolve_sharepic(url, slug).await {
            Ok(public) => public,
            Err(err) => {
                warn!("Could not resolve sharepic for '{slug}': {err}");
                String::new()
            }
        }
    }

    async fn resolve_sharepic(&self, url: &str, slug: &str) -> Result<String, SyncError> {
        let bytes = self.board.download(url).await?;
        self.storage
            .put_object(&bytes, &format!("{slug}.png"), self.sharepic_bucket, "image/png")
            .await
    }
}
