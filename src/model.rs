use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Case-insensitive name-to-value mapping of a card's custom fields.
///
/// Keys are lower-cased once on insert so lookups never have to care about
/// how the board capitalizes field names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomFields(HashMap<String, String>);

impl CustomFields {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names present on the card, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for CustomFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(&name, value);
        }
        fields
    }
}

/// A unit of editorial work on the board, one per candidate snack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub description: String,
    pub custom_fields: CustomFields,
    pub attachments: Vec<RawAttachment>,
}

/// An attachment exactly as the board reports it, before classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAttachment {
    pub url: String,
    pub name: String,
}

/// Maps a human-readable custom field name to the board-side identifier
/// needed to write the field back. Fetched once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentType {
    /// A web link backing the fact
    Source,
    /// A pre-designed social-media share image
    Sharepic,
}

/// A classified attachment. Only HTTP(S) attachments qualify.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub kind: AttachmentType,
    pub url: String,
}

/// The published fact-check record, in the backend's wire shape.
///
/// An empty `id` means the backend has not assigned one yet (the next upsert
/// creates); a non-empty `id` is the permanent key linking card and record
/// (the next upsert updates in place).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnackRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub slug: String,
    pub headline: String,
    #[serde(default)]
    pub claim: String,
    pub snack: String,
    #[serde(rename = "url", default)]
    pub source_url: String,
    #[serde(default)]
    pub date: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub sharepic_url: String,
}

fn default_category() -> String {
    "None".to_string()
}

/// A named, curated grouping of published facts with a validity window.
/// The id travels in the URL, never in the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    #[serde(rename = "_id", default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub comment: String,
    pub valid_through: String,
    pub facts: Vec<String>,
}

/// One fact's recommendation list. Each run fully replaces the
/// recommendations for the facts it processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEdge {
    pub fact: String,
    pub recommends: Vec<String>,
}
