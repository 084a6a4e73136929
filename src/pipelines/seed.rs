//! Seed a board list with cards built from existing records.
//!
//! The reverse direction of the sync: one card per record, the source
//! attached as a URL attachment, metadata written into custom fields. All
//! field writes are optional — a board without the field, or a value the
//! board rejects, costs a log line and nothing else.

use log::{debug, error, info};

use crate::board::Board;
use crate::error::SyncError;
use crate::fields::{FIELD_CATEGORY, FIELD_DATE, FIELD_MEDIUM, FIELD_TAGS};
use crate::model::{FieldDefinition, SnackRecord};

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub board_id: String,
    pub to_list: String,
}

/// Create one card per record at the top of the target list. Returns how
/// many cards were created.
pub async fn run(
    board: &dyn Board,
    options: &SeedOptions,
    records: &[SnackRecord],
) -> Result<usize, SyncError> {
    let definitions = board.custom_field_definitions(&options.board_id).await?;

    let mut created = 0;
    for record in records {
        let card_id = match board
            .create_card(&options.to_list, &record.headline, &record.snack)
            .await
        {
            Ok(card_id) => card_id,
            Err(err) => {
                error!("Could not create card for '{}': {err}", record.headline);
                continue;
            }
        };

        if !record.source_url.is_empty() {
            if let Err(err) = board.attach_url(&card_id, "Source", &record.source_url).await {
                debug!("Could not attach source to card {card_id}: {err}");
            }
        }

        // Optional writes and their values; each degrades to a log line.
        let optional_fields = [
            (FIELD_DATE, record.date.as_str()),
            (FIELD_CATEGORY, record.category.as_str()),
            (FIELD_MEDIUM, record.medium.as_str()),
            (FIELD_TAGS, record.tags.as_str()),
        ];
        for (name, value) in optional_fields {
            if value.is_empty() {
                continue;
            }
            let Some(definition) = find_definition(&definitions, name) else {
                debug!("Board has no custom field '{name}'");
                continue;
            };
            if let Err(err) = board.set_custom_field(&card_id, definition, value).await {
                debug!("Could not set custom field '{name}' for card {card_id}: {err}");
            }
        }

        debug!("Added card '{}' to list {}", record.headline, options.to_list);
        created += 1;
    }

    info!("Seeded {} cards into list {}", created, options.to_list);
    Ok(created)
}

fn find_definition<'a>(
    definitions: &'a [FieldDefinition],
    name: &str,
) -> Option<&'a FieldDefinition> {
    definitions
        .iter()
        .find(|definition| definition.name.eq_ignore_ascii_case(name))
}
