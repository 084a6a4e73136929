mod strapi;

pub use strapi::StrapiStore;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::model::{CollectionRecord, RecommendationEdge, SnackRecord};

/// Result of a single record upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    /// Backend-assigned identifier, when the response body carried one.
    /// A successful write without a usable id still counts as published;
    /// only the write-back has to be skipped.
    pub id: Option<String>,
    /// True when the write created a new record
    pub created: bool,
}

/// The headless content store the snacks are published to.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create the record (empty id) or update it in place (non-empty id).
    async fn upsert_record(&self, record: &SnackRecord) -> Result<UpsertOutcome, SyncError>;

    /// Fetch published records; a negative limit means unbounded.
    async fn get_records(&self, limit: i64) -> Result<Vec<SnackRecord>, SyncError>;

    /// Replace one fact's recommendation list.
    async fn create_recommendation(&self, edge: &RecommendationEdge) -> Result<(), SyncError>;

    /// Create or update a curated collection.
    async fn upsert_collection(&self, collection: &CollectionRecord) -> Result<(), SyncError>;
}
