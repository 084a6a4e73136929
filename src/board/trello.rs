use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use crate::board::Board;
use crate::config::TrelloConfig;
use crate::error::SyncError;
use crate::http::{build_client, send_with_retry};
use crate::model::{Card, CustomFields, FieldDefinition, RawAttachment};

/// REST client for the Trello API.
///
/// Regular calls authenticate via `key`/`token` query parameters;
/// attachment downloads go through the OAuth authorization header instead,
/// since Trello only serves uploaded files to signed requests.
pub struct TrelloBoard {
    client: Client,
    base_url: String,
    api_key: String,
    api_token: String,
}

impl TrelloBoard {
    /// Create a new board client from configuration. Both credentials are
    /// required; a missing one is a startup error.
    pub fn new(config: &TrelloConfig, timeout_secs: u64) -> Result<Self, SyncError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(SyncError::MissingCredential("trello.api_key"))?;
        let api_token = config
            .api_token
            .clone()
            .ok_or(SyncError::MissingCredential("trello.api_token"))?;

        Ok(TrelloBoard {
            client: build_client(timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_token,
        })
    }

    fn auth(&self) -> [(&'static str, &str); 2] {
        [("key", &self.api_key), ("token", &self.api_token)]
    }

    async fn ensure_success(response: Response) -> Result<Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SyncError::Board {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CardDto {
    id: String,
    name: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    attachments: Vec<AttachmentDto>,
    #[serde(default, rename = "customFieldItems")]
    custom_field_items: Vec<CustomFieldItemDto>,
}

#[derive(Debug, Deserialize)]
struct AttachmentDto {
    #[serde(default)]
    url: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CustomFieldItemDto {
    #[serde(rename = "idCustomField")]
    id_custom_field: String,
    #[serde(default)]
    value: Option<CustomFieldValueDto>,
}

// Trello types the value by key; exactly one of these is set per item.
#[derive(Debug, Default, Deserialize)]
struct CustomFieldValueDto {
    text: Option<String>,
    number: Option<String>,
    date: Option<String>,
    checked: Option<String>,
}

impl CustomFieldValueDto {
    fn raw(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or(self.number.as_deref())
            .or(self.date.as_deref())
            .or(self.checked.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct FieldDefinitionDto {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedCardDto {
    id: String,
}

impl CardDto {
    fn into_card(self, definitions: &[FieldDefinition]) -> Card {
        let mut custom_fields = CustomFields::new();
        for item in &self.custom_field_items {
            let Some(definition) = definitions.iter().find(|d| d.id == item.id_custom_field)
            else {
                debug!(
                    "Card '{}' carries a value for unknown custom field {}",
                    self.name, item.id_custom_field
                );
                continue;
            };
            if let Some(value) = item.value.as_ref().and_then(CustomFieldValueDto::raw) {
                custom_fields.insert(&definition.name, value);
            }
        }

        Card {
            id: self.id,
            title: self.name,
            description: self.desc,
            custom_fields,
            attachments: self
                .attachments
                .into_iter()
                .map(|a| RawAttachment {
                    url: a.url,
                    name: a.name,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl Board for TrelloBoard {
    async fn custom_field_definitions(
        &self,
        board_id: &str,
    ) -> Result<Vec<FieldDefinition>, SyncError> {
        let url = format!("{}/1/boards/{}/customFields", self.base_url, board_id);
        let response = send_with_retry(self.client.get(&url).query(&self.auth())).await?;
        let response = Self::ensure_success(response).await?;

        let definitions: Vec<FieldDefinitionDto> = response.json().await?;
        Ok(definitions
            .into_iter()
            .map(|d| FieldDefinition {
                id: d.id,
                name: d.name,
            })
            .collect())
    }

    async fn list_cards(
        &self,
        list_id: &str,
        definitions: &[FieldDefinition],
    ) -> Result<Vec<Card>, SyncError> {
        let url = format!("{}/1/lists/{}/cards", self.base_url, list_id);
        let response = send_with_retry(
            self.client
                .get(&url)
                .query(&self.auth())
                .query(&[
                    ("attachments", "true"),
                    ("customFieldItems", "true"),
                    ("fields", "id,name,desc"),
                ]),
        )
        .await?;
        let response = Self::ensure_success(response).await?;

        let cards: Vec<CardDto> = response.json().await?;
        Ok(cards
            .into_iter()
            .map(|dto| dto.into_card(definitions))
            .collect())
    }

    async fn set_custom_field(
        &self,
        card_id: &str,
        field: &FieldDefinition,
        value: &str,
    ) -> Result<(), SyncError> {
        let url = format!(
            "{}/1/cards/{}/customField/{}/item",
            self.base_url, card_id, field.id
        );
        let response = send_with_retry(
            self.client
                .put(&url)
                .query(&self.auth())
                .json(&json!({ "value": { "text": value } })),
        )
        .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<(), SyncError> {
        let url = format!("{}/1/cards/{}", self.base_url, card_id);
        let response = send_with_retry(
            self.client
                .put(&url)
                .query(&self.auth())
                .query(&[("idList", list_id)]),
        )
        .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn comment(&self, card_id: &str, text: &str) -> Result<(), SyncError> {
        let url = format!("{}/1/cards/{}/actions/comments", self.base_url, card_id);
        let response = send_with_retry(
            self.client
                .post(&url)
                .query(&self.auth())
                .query(&[("text", text)]),
        )
        .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn create_card(
        &self,
        list_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String, SyncError> {
        let url = format!("{}/1/cards", self.base_url);
        let response = send_with_retry(
            self.client.post(&url).query(&self.auth()).json(&json!({
                "idList": list_id,
                "name": name,
                "desc": description,
                "pos": "top",
            })),
        )
        .await?;
        let response = Self::ensure_success(response).await?;

        let created: CreatedCardDto = response.json().await?;
        Ok(created.id)
    }

    async fn attach_url(&self, card_id: &str, name: &str, url: &str) -> Result<(), SyncError> {
        let endpoint = format!("{}/1/cards/{}/attachments", self.base_url, card_id);
        let response = send_with_retry(
            self.client
                .post(&endpoint)
                .query(&self.auth())
                .json(&json!({ "url": url, "name": name })),
        )
        .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SyncError> {
        let authorization = format!(
            "OAuth oauth_consumer_key=\"{}\", oauth_token=\"{}\"",
            self.api_key, self.api_token
        );
        let response = send_with_retry(
            self.client.get(url).header("Authorization", authorization),
        )
        .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
