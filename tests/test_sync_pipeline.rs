//! End-to-end sync scenarios against mocked board and backend APIs.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use snack_sync::assets::AssetResolver;
use snack_sync::backend::StrapiStore;
use snack_sync::board::TrelloBoard;
use snack_sync::catalog::UnsplashCatalog;
use snack_sync::config::{StrapiConfig, TrelloConfig, UnsplashConfig};
use snack_sync::error::SyncError;
use snack_sync::pipelines::sync::{self, CardState, SyncOptions};
use snack_sync::storage::ObjectStorage;

/// Records uploads instead of talking to S3; URLs mirror the real
/// bucket/key scheme.
#[derive(Default)]
struct MemoryStorage {
    uploads: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put_object(
        &self,
        _data: &[u8],
        key: &str,
        bucket: &str,
        content_type: &str,
    ) -> Result<String, SyncError> {
        self.uploads.lock().unwrap().push((
            bucket.to_string(),
            key.to_string(),
            content_type.to_string(),
        ));
        Ok(format!("https://{bucket}.storage.example/{key}"))
    }
}

struct Harness {
    board: TrelloBoard,
    store: StrapiStore,
    catalog: UnsplashCatalog,
    storage: MemoryStorage,
}

impl Harness {
    fn new(server: &ServerGuard) -> Self {
        let board = TrelloBoard::new(
            &TrelloConfig {
                api_key: Some("test-key".to_string()),
                api_token: Some("test-token".to_string()),
                base_url: server.url(),
            },
            5,
        )
        .unwrap();
        let store = StrapiStore::new(
            &StrapiConfig {
                auth_token: Some("test-jwt".to_string()),
                base_url: server.url(),
            },
            5,
        )
        .unwrap();
        let catalog = UnsplashCatalog::new(
            &UnsplashConfig {
                access_key: Some("test-access-key".to_string()),
                base_url: server.url(),
            },
            5,
        );
        Harness {
            board,
            store,
            catalog,
            storage: MemoryStorage::default(),
        }
    }

    fn assets(&self) -> AssetResolver<'_> {
        AssetResolver {
            catalog: &self.catalog,
            storage: &self.storage,
            board: &self.board,
            image_bucket: "snack-images",
            sharepic_bucket: "sharepics",
        }
    }
}

fn definitions_body() -> String {
    json!([
        { "id": "f-id", "name": "ID" },
        { "id": "f-date", "name": "Datum" },
        { "id": "f-cat", "name": "Kategorie" },
        { "id": "f-med", "name": "Medium" },
        { "id": "f-img", "name": "Bild" }
    ])
    .to_string()
}

fn card_body(date: &str, extra_field_items: serde_json::Value) -> String {
    let mut items = vec![
        json!({ "idCustomField": "f-date", "value": { "text": date } }),
        json!({ "idCustomField": "f-cat", "value": { "text": "health" } }),
        json!({ "idCustomField": "f-med", "value": { "text": "web" } }),
    ];
    if let Some(extra) = extra_field_items.as_array() {
        items.extend(extra.iter().cloned());
    }
    json!([{
        "id": "card-1",
        "name": "Vaccines cause X",
        "desc": "Vaccines cause X === Studies show Y",
        "attachments": [{ "url": "http://src.example/a", "name": "a" }],
        "customFieldItems": items
    }])
    .to_string()
}

fn mock_board_reads(server: &mut ServerGuard, cards: String) -> (mockito::Mock, mockito::Mock) {
    let definitions = server
        .mock("GET", "/1/boards/board-1/customFields")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(definitions_body())
        .create();
    let list = server
        .mock("GET", "/1/lists/list-in/cards")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(cards)
        .create();
    (definitions, list)
}

fn options(push: bool, move_to: Option<&str>) -> SyncOptions {
    SyncOptions {
        board_id: "board-1".to_string(),
        from_list: "list-in".to_string(),
        move_to: move_to.map(str::to_string),
        push,
    }
}

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn embargoed_card_is_assembled_but_never_pushed() {
    let mut server = Server::new_async().await;
    let _reads = mock_board_reads(&mut server, card_body("2999-01-01", json!([])));
    let facts = server.mock("POST", "/facts").expect(0).create();

    let harness = Harness::new(&server);
    let outcomes = sync::run(
        &harness.board,
        &harness.store,
        &harness.assets(),
        &options(true, None),
        fixed_now(),
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.state, CardState::Embargoed);
    assert_eq!(outcome.record.claim, "Vaccines cause X");
    assert_eq!(outcome.record.snack, "Studies show Y");
    assert_eq!(outcome.record.category, "health");
    assert_eq!(outcome.record.image_url, "");
    assert!(!outcome.relocated);
    facts.assert();
}

#[tokio::test]
async fn released_card_is_created_and_id_written_back() {
    let mut server = Server::new_async().await;
    let _reads = mock_board_reads(&mut server, card_body("2026-08-05", json!([])));
    let create = server
        .mock("POST", "/facts")
        .match_header("authorization", "Bearer test-jwt")
        .match_body(Matcher::PartialJson(json!({
            "headline": "Vaccines cause X",
            "claim": "Vaccines cause X",
            "snack": "Studies show Y",
            "url": "http://src.example/a"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"_id": "abc123"}"#)
        .create();
    let write_back = server
        .mock("PUT", "/1/cards/card-1/customField/f-id/item")
        .match_query(Matcher::Any)
        .match_body(Matcher::Json(json!({ "value": { "text": "abc123" } })))
        .with_status(200)
        .with_body("{}")
        .create();
    let relocate = server
        .mock("PUT", "/1/cards/card-1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("idList".into(), "list-done".into()),
            Matcher::UrlEncoded("key".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create();

    let harness = Harness::new(&server);
    let outcomes = sync::run(
        &harness.board,
        &harness.store,
        &harness.assets(),
        &options(true, Some("list-done")),
        fixed_now(),
    )
    .await
    .unwrap();

    let outcome = &outcomes[0];
    assert_eq!(outcome.state, CardState::Published);
    assert_eq!(outcome.record.id, "abc123");
    assert!(outcome.relocated);
    create.assert();
    write_back.assert();
    relocate.assert();
}

#[tokio::test]
async fn card_with_assigned_id_is_updated_in_place() {
    let mut server = Server::new_async().await;
    let cards = card_body(
        "2026-08-05",
        json!([{ "idCustomField": "f-id", "value": { "text": "abc123" } }]),
    );
    let _reads = mock_board_reads(&mut server, cards);
    let update = server
        .mock("PUT", "/facts/abc123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"_id": "abc123"}"#)
        .create();
    let create = server.mock("POST", "/facts").expect(0).create();
    let _write_back = server
        .mock("PUT", "/1/cards/card-1/customField/f-id/item")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create();

    let harness = Harness::new(&server);
    let outcomes = sync::run(
        &harness.board,
        &harness.store,
        &harness.assets(),
        &options(true, None),
        fixed_now(),
    )
    .await
    .unwrap();

    assert_eq!(outcomes[0].state, CardState::Published);
    update.assert();
    create.assert();
}

#[tokio::test]
async fn card_without_source_is_skipped_and_commented() {
    let mut server = Server::new_async().await;
    let cards = json!([{
        "id": "card-1",
        "name": "No source here",
        "desc": "text",
        "attachments": [{ "url": "https://x.example/pic.png", "name": "pic.png" }],
        "customFieldItems": []
    }])
    .to_string();
    let _reads = mock_board_reads(&mut server, cards);
    let facts = server.mock("POST", "/facts").expect(0).create();
    let comment = server
        .mock("POST", "/1/cards/card-1/actions/comments")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create();

    let harness = Harness::new(&server);
    let outcomes = sync::run(
        &harness.board,
        &harness.store,
        &harness.assets(),
        &options(true, None),
        fixed_now(),
    )
    .await
    .unwrap();

    assert_eq!(outcomes[0].state, CardState::MissingSource);
    assert_eq!(outcomes[0].record.source_url, "");
    facts.assert();
    comment.assert();
}

#[tokio::test]
async fn publish_failure_does_not_halt_the_run() {
    let mut server = Server::new_async().await;
    let cards = json!([
        {
            "id": "card-1",
            "name": "First",
            "desc": "a === b",
            "attachments": [{ "url": "http://src.example/a", "name": "a" }],
            "customFieldItems": [
                { "idCustomField": "f-date", "value": { "text": "2026-08-05" } }
            ]
        },
        {
            "id": "card-2",
            "name": "Second",
            "desc": "c === d",
            "attachments": [{ "url": "http://src.example/b", "name": "b" }],
            "customFieldItems": [
                { "idCustomField": "f-date", "value": { "text": "2026-08-05" } }
            ]
        }
    ])
    .to_string();
    let _reads = mock_board_reads(&mut server, cards);
    // The backend rejects everything; both cards must still be processed.
    let facts = server
        .mock("POST", "/facts")
        .with_status(403)
        .with_body("forbidden")
        .expect(2)
        .create();

    let harness = Harness::new(&server);
    let outcomes = sync::run(
        &harness.board,
        &harness.store,
        &harness.assets(),
        &options(true, None),
        fixed_now(),
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes
        .iter()
        .all(|outcome| outcome.state == CardState::PublishFailed));
    facts.assert();
}

#[tokio::test]
async fn assets_are_resolved_into_bucket_urls() {
    let mut server = Server::new_async().await;
    let cards = json!([{
        "id": "card-1",
        "name": "Die Erde ist flach",
        "desc": "flach === Ellipsoid.",
        "attachments": [
            { "url": "http://src.example/a", "name": "a" },
            { "url": format!("{}/sharepic.png", server.url()), "name": "sharepic.png" }
        ],
        "customFieldItems": [
            { "idCustomField": "f-date", "value": { "text": "2026-08-05" } },
            { "idCustomField": "f-img", "value": { "text": "xYz_9" } }
        ]
    }])
    .to_string();
    let _reads = mock_board_reads(&mut server, cards);
    let _photo = server
        .mock("GET", "/photos/xYz_9")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "urls": { "regular": format!("{}/regular.jpg", server.url()) } }).to_string())
        .create();
    let _regular = server
        .mock("GET", "/regular.jpg")
        .with_status(200)
        .with_body([0xffu8, 0xd8])
        .create();
    let sharepic_download = server
        .mock("GET", "/sharepic.png")
        .match_header(
            "authorization",
            Matcher::Regex("^OAuth oauth_consumer_key=".to_string()),
        )
        .with_status(200)
        .with_body([0x89u8, 0x50])
        .create();

    let harness = Harness::new(&server);
    let outcomes = sync::run(
        &harness.board,
        &harness.store,
        &harness.assets(),
        &options(false, None),
        fixed_now(),
    )
    .await
    .unwrap();

    let record = &outcomes[0].record;
    assert_eq!(outcomes[0].state, CardState::Assembled);
    assert_eq!(
        record.image_url,
        "https://snack-images.storage.example/xYz_9.jpg"
    );
    assert_eq!(
        record.sharepic_url,
        "https://sharepics.storage.example/erde-flach.png"
    );

    let uploads = harness.storage.uploads.lock().unwrap();
    assert_eq!(
        *uploads,
        vec![
            (
                "snack-images".to_string(),
                "xYz_9.jpg".to_string(),
                "image/jpeg".to_string()
            ),
            (
                "sharepics".to_string(),
                "erde-flach.png".to_string(),
                "image/png".to_string()
            ),
        ]
    );
    sharepic_download.assert();
}

#[tokio::test]
async fn asset_failure_degrades_to_empty_url() {
    let mut server = Server::new_async().await;
    let cards = json!([{
        "id": "card-1",
        "name": "Die Erde ist flach",
        "desc": "flach === Ellipsoid.",
        "attachments": [{ "url": "http://src.example/a", "name": "a" }],
        "customFieldItems": [
            { "idCustomField": "f-date", "value": { "text": "2026-08-05" } },
            { "idCustomField": "f-img", "value": { "text": "gone_1" } }
        ]
    }])
    .to_string();
    let _reads = mock_board_reads(&mut server, cards);
    let _photo = server
        .mock("GET", "/photos/gone_1")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("not found")
        .create();

    let harness = Harness::new(&server);
    let outcomes = sync::run(
        &harness.board,
        &harness.store,
        &harness.assets(),
        &options(false, None),
        fixed_now(),
    )
    .await
    .unwrap();

    assert_eq!(outcomes[0].state, CardState::Assembled);
    assert_eq!(outcomes[0].record.image_url, "");
    assert!(harness.storage.uploads.lock().unwrap().is_empty());
}
