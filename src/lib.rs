pub mod assets;
pub mod attachments;
pub mod backend;
pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fields;
pub mod http;
pub mod model;
pub mod pipelines;
pub mod similarity;
pub mod storage;
pub mod text;

use std::path::Path;

use chrono::Utc;

use crate::assets::AssetResolver;
use crate::backend::StrapiStore;
use crate::board::TrelloBoard;
use crate::catalog::UnsplashCatalog;
use crate::pipelines::collection::CollectionOptions;
use crate::pipelines::seed::SeedOptions;
use crate::pipelines::sync::{CardOutcome, SyncOptions};
use crate::similarity::LexicalSimilarity;
use crate::storage::S3Storage;

pub use crate::config::AppConfig;
pub use crate::error::SyncError;
pub use crate::model::{Card, CollectionRecord, RecommendationEdge, SnackRecord};

/// Run the card sync against the live board and backend.
pub async fn sync_cards(
    config: &AppConfig,
    options: &SyncOptions,
) -> Result<Vec<CardOutcome>, SyncError> {
    let board = TrelloBoard::new(&config.trello, config.timeout)?;
    let store = StrapiStore::new(&config.strapi, config.timeout)?;
    let storage = S3Storage::new(&config.storage)?;
    let catalog = UnsplashCatalog::new(&config.unsplash, config.timeout);
    let assets = AssetResolver {
        catalog: &catalog,
        storage: &storage,
        board: &board,
        image_bucket: &config.storage.image_bucket,
        sharepic_bucket: &config.storage.sharepic_bucket,
    };

    pipelines::sync::run(&board, &store, &assets, options, Utc::now()).await
}

/// Push a local JSON file of records to the backend.
pub async fn push_records_file(config: &AppConfig, path: &Path) -> Result<usize, SyncError> {
    let store = StrapiStore::new(&config.strapi, config.timeout)?;
    let records = pipelines::push::parse_records(&std::fs::read_to_string(path)?)?;
    pipelines::push::run(&store, &records).await
}

/// Recompute the recommendation graph over the published corpus.
pub async fn recompute_recommendations(
    config: &AppConfig,
    top_n: usize,
) -> Result<usize, SyncError> {
    let store = StrapiStore::new(&config.strapi, config.timeout)?;
    let engine = LexicalSimilarity::new();
    pipelines::recommend::run(&store, &engine, top_n).await
}

/// Push a curated board list as a named collection.
pub async fn push_collection(
    config: &AppConfig,
    options: &CollectionOptions,
) -> Result<CollectionRecord, SyncError> {
    let board = TrelloBoard::new(&config.trello, config.timeout)?;
    let store = StrapiStore::new(&config.strapi, config.timeout)?;
    pipelines::collection::run(&board, &store, options).await
}

/// Seed a board list with cards built from a local JSON file of records.
pub async fn seed_board(
    config: &AppConfig,
    options: &SeedOptions,
    path: &Path,
) -> Result<usize, SyncError> {
    let board = TrelloBoard::new(&config.trello, config.timeout)?;
    let records = pipelines::push::parse_records(&std::fs::read_to_string(path)?)?;
    pipelines::seed::run(&board, options, &records).await
}
