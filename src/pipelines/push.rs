//! Push a local JSON file of records to the backend.

use log::{debug, error};

use crate::backend::ContentStore;
use crate::error::SyncError;
use crate::model::SnackRecord;

/// Parse a records file: either a JSON array of records or a single
/// record object.
pub fn parse_records(text: &str) -> Result<Vec<SnackRecord>, SyncError> {
    match serde_json::from_str::<Vec<SnackRecord>>(text) {
        Ok(records) => Ok(records),
        Err(_) => Ok(vec![serde_json::from_str::<SnackRecord>(text)?]),
    }
}

/// Upsert each record, best-effort. Returns how many landed.
pub async fn run(store: &dyn ContentStore, records: &[SnackRecord]) -> Result<usize, SyncError> {
    let mut pushed = 0;
    for record in records {
        match store.upsert_record(record).await {
            Ok(outcome) => {
                pushed += 1;
                debug!(
                    "{} '{}'",
                    if outcome.created { "Created" } else { "Updated" },
                    record.slug
                );
            }
            Err(err) => error!("Could not push record '{}': {err}", record.slug),
        }
    }
    Ok(pushed)
}
