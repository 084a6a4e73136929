use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use crate::backend::{ContentStore, UpsertOutcome};
use crate::config::StrapiConfig;
use crate::error::SyncError;
use crate::http::{build_client, send_with_retry};
use crate::model::{CollectionRecord, RecommendationEdge, SnackRecord};

/// REST client for the Strapi backend. Writes authenticate with a JWT
/// bearer token; reads are public.
pub struct StrapiStore {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl StrapiStore {
    /// Create a new backend client from configuration. The auth token is
    /// required; a missing one is a startup error.
    pub fn new(config: &StrapiConfig, timeout_secs: u64) -> Result<Self, SyncError> {
        let auth_token = config
            .auth_token
            .clone()
            .ok_or(SyncError::MissingCredential("strapi.auth_token"))?;

        Ok(StrapiStore {
            client: build_client(timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }
}

/// The upsert body: the record minus its identifier, which travels in the
/// URL for updates and does not exist yet for creates.
fn wire_body(record: &SnackRecord) -> Result<Value, SyncError> {
    let mut body = serde_json::to_value(record)?;
    if let Some(object) = body.as_object_mut() {
        object.remove("_id");
    }
    Ok(body)
}

#[async_trait]
impl ContentStore for StrapiStore {
    async fn upsert_record(&self, record: &SnackRecord) -> Result<UpsertOutcome, SyncError> {
        let body = wire_body(record)?;
        let created = record.id.is_empty();
        let (request, url) = if created {
            let url = format!("{}/facts", self.base_url);
            (self.client.post(&url), url)
        } else {
            let url = format!("{}/facts/{}", self.base_url, record.id);
            (self.client.put(&url), url)
        };
        debug!(
            "Sending {} request to {}",
            if created { "POST" } else { "PUT" },
            url
        );

        let response =
            send_with_retry(request.bearer_auth(&self.auth_token).json(&body)).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        let id = body.get("_id").and_then(Value::as_str).map(str::to_string);
        Ok(UpsertOutcome { id, created })
    }

    async fn get_records(&self, limit: i64) -> Result<Vec<SnackRecord>, SyncError> {
        let url = format!("{}/facts", self.base_url);
        let response = send_with_retry(
            self.client.get(&url).query(&[("_limit", limit.to_string())]),
        )
        .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<Vec<SnackRecord>>().await {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!("Backend returned a response that was not a record list: {err}");
                Ok(Vec::new())
            }
        }
    }

    async fn create_recommendation(&self, edge: &RecommendationEdge) -> Result<(), SyncError> {
        let url = format!("{}/recommendations", self.base_url);
        debug!("Sending POST request to {} for fact {}", url, edge.fact);

        let response =
            send_with_retry(self.client.post(&url).bearer_auth(&self.auth_token).json(edge))
                .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn upsert_collection(&self, collection: &CollectionRecord) -> Result<(), SyncError> {
        let (request, url) = if collection.id.is_empty() {
            let url = format!("{}/collections", self.base_url);
            (self.client.post(&url), url)
        } else {
            let url = format!("{}/collections/{}", self.base_url, collection.id);
            (self.client.put(&url), url)
        };
        debug!("Sending collection '{}' to {}", collection.name, url);

        let response =
            send_with_retry(request.bearer_auth(&self.auth_token).json(collection)).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn test_store(server: &Server) -> StrapiStore {
        let config = StrapiConfig {
            auth_token: Some("test-jwt".to_string()),
            base_url: server.url(),
        };
        StrapiStore::new(&config, 5).unwrap()
    }

    fn record(id: &str) -> SnackRecord {
        SnackRecord {
            id: id.to_string(),
            slug: "a-slug".to_string(),
            headline: "A headline".to_string(),
            snack: "A fact".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_token_fails_construction() {
        let result = StrapiStore::new(&StrapiConfig::default(), 5);
        assert!(matches!(result, Err(SyncError::MissingCredential(_))));
    }

    #[test]
    fn wire_body_strips_the_id() {
        let body = wire_body(&record("abc123")).unwrap();
        assert!(body.get("_id").is_none());
        assert_eq!(body["slug"], "a-slug");
    }

    #[tokio::test]
    async fn empty_id_issues_a_create() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/facts")
            .match_header("authorization", "Bearer test-jwt")
            .match_body(Matcher::PartialJson(json!({ "slug": "a-slug" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_id": "abc123", "slug": "a-slug"}"#)
            .create();

        let store = test_store(&server);
        let outcome = store.upsert_record(&record("")).await.unwrap();

        assert_eq!(outcome.id.as_deref(), Some("abc123"));
        assert!(outcome.created);
        mock.assert();
    }

    #[tokio::test]
    async fn assigned_id_issues_an_update_to_the_id_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/facts/abc123")
            .match_header("authorization", "Bearer test-jwt")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_id": "abc123"}"#)
            .create();

        let store = test_store(&server);
        let outcome = store.upsert_record(&record("abc123")).await.unwrap();

        assert_eq!(outcome.id.as_deref(), Some("abc123"));
        assert!(!outcome.created);
        mock.assert();
    }

    #[tokio::test]
    async fn rejected_upsert_surfaces_status_and_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/facts")
            .with_status(403)
            .with_body("forbidden")
            .create();

        let store = test_store(&server);
        let err = store.upsert_record(&record("")).await.unwrap_err();
        match err {
            SyncError::Backend { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn get_records_passes_the_unbounded_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/facts")
            .match_query(Matcher::UrlEncoded("_limit".into(), "-1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"_id": "f1", "slug": "s", "headline": "H", "snack": "T"}]"#)
            .create();

        let store = test_store(&server);
        let records = store.get_records(-1).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "f1");
        mock.assert();
    }

    #[tokio::test]
    async fn non_json_record_list_degrades_to_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/facts")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create();

        let store = test_store(&server);
        let records = store.get_records(-1).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn recommendation_posts_fact_and_recommends() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/recommendations")
            .match_body(Matcher::Json(
                json!({ "fact": "f1", "recommends": ["f2", "f3"] }),
            ))
            .with_status(200)
            .with_body("{}")
            .create();

        let store = test_store(&server);
        let edge = RecommendationEdge {
            fact: "f1".to_string(),
            recommends: vec!["f2".to_string(), "f3".to_string()],
        };
        store.create_recommendation(&edge).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn collection_with_id_updates_in_place() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/collections/col-9")
            .match_body(Matcher::PartialJson(json!({ "name": "Climate week" })))
            .with_status(200)
            .with_body("{}")
            .create();

        let store = test_store(&server);
        let collection = CollectionRecord {
            id: "col-9".to_string(),
            name: "Climate week".to_string(),
            comment: String::new(),
            valid_through: "2026-12-31".to_string(),
            facts: vec!["f1".to_string()],
        };
        store.upsert_collection(&collection).await.unwrap();
        mock.assert();
    }
}
