mod trello;

pub use trello::TrelloBoard;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::model::{Card, FieldDefinition};

/// The collaborative card board the snacks are drafted on.
///
/// The sync pipeline reads lists and mutates single cards; it never deletes
/// or reorders anything on the board.
#[async_trait]
pub trait Board: Send + Sync {
    /// Custom field definitions of a board. Fetched once per run and
    /// treated as immutable within it.
    async fn custom_field_definitions(
        &self,
        board_id: &str,
    ) -> Result<Vec<FieldDefinition>, SyncError>;

    /// Cards in a list, with custom field values resolved to their
    /// human-readable names via `definitions`.
    async fn list_cards(
        &self,
        list_id: &str,
        definitions: &[FieldDefinition],
    ) -> Result<Vec<Card>, SyncError>;

    /// Write a custom field value back onto a card.
    async fn set_custom_field(
        &self,
        card_id: &str,
        field: &FieldDefinition,
        value: &str,
    ) -> Result<(), SyncError>;

    /// Move a card to another list.
    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<(), SyncError>;

    /// Post a comment on a card.
    async fn comment(&self, card_id: &str, text: &str) -> Result<(), SyncError>;

    /// Create a card at the top of a list, returning the new card's id.
    async fn create_card(
        &self,
        list_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String, SyncError>;

    /// Attach a URL to a card.
    async fn attach_url(&self, card_id: &str, name: &str, url: &str) -> Result<(), SyncError>;

    /// Fetch an attachment's bytes through the signed-header path, for
    /// attachments the board only serves to authenticated clients.
    async fn download(&self, url: &str) -> Result<Vec<u8>, SyncError>;
}
