//! Partition a card's attachments into source links and sharepics.

use crate::error::SyncError;
use crate::model::{Attachment, AttachmentType, RawAttachment};

/// Filename extension marking a sharepic attachment.
pub const SHAREPIC_EXTENSION: &str = ".png";

/// Classify a card's attachments. Only HTTP(S) URLs qualify; among those,
/// names ending in the sharepic extension are sharepics and everything
/// else is a source link.
pub fn classify(attachments: &[RawAttachment]) -> Vec<Attachment> {
    attachments
        .iter()
        .filter(|attachment| attachment.url.starts_with("http"))
        .map(|attachment| {
            let kind = if attachment.name.ends_with(SHAREPIC_EXTENSION) {
                AttachmentType::Sharepic
            } else {
                AttachmentType::Source
            };
            Attachment {
                kind,
                url: attachment.url.clone(),
            }
        })
        .collect()
}

/// The card's source URL. When several sources are attached the first in
/// scan order wins; a card without one cannot be published.
pub fn source_url<'a>(attachments: &'a [Attachment], card_title: &str) -> Result<&'a str, SyncError> {
    attachments
        .iter()
        .find(|attachment| attachment.kind == AttachmentType::Source)
        .map(|attachment| attachment.url.as_str())
        .ok_or_else(|| SyncError::MissingSource(card_title.to_string()))
}

/// The card's sharepic URL, if any. Extra sharepics are ignored.
pub fn sharepic_url(attachments: &[Attachment]) -> Option<&str> {
    attachments
        .iter()
        .find(|attachment| attachment.kind == AttachmentType::Sharepic)
        .map(|attachment| attachment.url.as_str())
}
