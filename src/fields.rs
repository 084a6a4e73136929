//! Typed extraction of snack metadata out of a card's custom fields.

use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;

use crate::model::CustomFields;

// Custom field names as they appear on the board.
pub const FIELD_ID: &str = "id";
pub const FIELD_DATE: &str = "datum";
pub const FIELD_CATEGORY: &str = "kategorie";
pub const FIELD_MEDIUM: &str = "medium";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_IMAGE: &str = "bild";

/// Sentinel category for cards without one.
pub const CATEGORY_NONE: &str = "None";

/// Obtain the value of a custom field, case-insensitively. A missing field
/// yields the default and a diagnostic; it never fails the card.
pub fn get_field(name: &str, fields: &CustomFields, default: &str) -> String {
    match fields.get(name) {
        Some(value) => value.trim().to_string(),
        None => {
            debug!("Could not get custom field '{name}', using default '{default}'");
            default.to_string()
        }
    }
}

/// The metadata fields a snack card carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnackFields {
    pub id: String,
    pub date: String,
    pub category: String,
    pub medium: String,
    pub tags: String,
    pub image: String,
}

/// Pull all snack metadata out of a card's custom fields, each with its
/// own default. `now` backs the date default so extraction stays
/// deterministic for a given run.
pub fn extract_snack_fields(fields: &CustomFields, now: DateTime<Utc>) -> SnackFields {
    let default_date = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    SnackFields {
        id: get_field(FIELD_ID, fields, ""),
        date: get_field(FIELD_DATE, fields, &default_date),
        category: get_field(FIELD_CATEGORY, fields, CATEGORY_NONE),
        medium: get_field(FIELD_MEDIUM, fields, ""),
        tags: get_field(FIELD_TAGS, fields, ""),
        image: get_field(FIELD_IMAGE, fields, ""),
    }
}
