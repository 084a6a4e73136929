//! Push a curated list of facts as a named collection.
//!
//! Editors line related cards up in a board list; each card's source
//! attachment points at the published record, so the record id is the
//! trailing path segment of that URL.

use log::{error, info, warn};

use crate::attachments;
use crate::backend::ContentStore;
use crate::board::Board;
use crate::error::SyncError;
use crate::model::CollectionRecord;

#[derive(Debug, Clone)]
pub struct CollectionOptions {
    pub from_list: String,
    pub name: String,
    pub comment: String,
    pub valid_through: String,
    /// Set to update an existing collection in place
    pub id: Option<String>,
}

/// Derive the fact ids from the list's cards and upsert the collection.
/// Returns the pushed record.
pub async fn run(
    board: &dyn Board,
    store: &dyn ContentStore,
    options: &CollectionOptions,
) -> Result<CollectionRecord, SyncError> {
    let cards = board.list_cards(&options.from_list, &[]).await?;

    let mut facts = Vec::new();
    for card in &cards {
        let classified = attachments::classify(&card.attachments);
        match attachments::source_url(&classified, &card.title) {
            Ok(url) => match fact_id_from_url(url) {
                Some(fact_id) => facts.push(fact_id),
                None => warn!("Attachment URL '{url}' on '{}' has no id segment", card.title),
            },
            Err(err) => error!("{err}"),
        }
    }

    let collection = CollectionRecord {
        id: options.id.clone().unwrap_or_default(),
        name: options.name.clone(),
        comment: options.comment.clone(),
        valid_through: options.valid_through.clone(),
        facts,
    };
    store.upsert_collection(&collection).await?;
    info!(
        "Pushed collection '{}' with {} facts",
        collection.name,
        collection.facts.len()
    );
    Ok(collection)
}

/// The trailing path segment of a URL, which for fact links is the
/// backend record id.
pub(crate) fn fact_id_from_url(url: &str) -> Option<String> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_the_trailing_path_segment() {
        assert_eq!(
            fact_id_from_url("https://factsforfriends.de/facts/5ec2a4"),
            Some("5ec2a4".to_string())
        );
        assert_eq!(
            fact_id_from_url("https://factsforfriends.de/facts/5ec2a4/"),
            Some("5ec2a4".to_string())
        );
    }

    #[test]
    fn bare_domains_yield_no_id() {
        assert_eq!(fact_id_from_url("https://factsforfriends.de"), Some("factsforfriends.de".to_string()));
        assert_eq!(fact_id_from_url("https://"), None);
    }
}
