use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::Duration;
use insta::assert_yaml_snapshot;
use kanban_core::{CardStatus, InMemoryCardStore};
use kanban_server::card::CardState;
use kanban_server::card::api::v1::{CardJson, CardsResponse};
use kanban_server::web::api::v1::ErrorResponse;
use kanban_server::web::create_app;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

/// Status and error body of a rejected request.
#[derive(Debug, Serialize)]
struct ErrorSnapshot {
    status: u16,
    body: ErrorResponse,
}

/// Test context for endpoint tests. Cards live in memory, so no container is needed.
struct TestContext {
    app: Router,
    store: InMemoryCardStore,
}

fn setup() -> TestContext {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let store = InMemoryCardStore::new();
    let state = Arc::new(CardState::new(Arc::new(store.clone())));
    TestContext {
        app: create_app(state),
        store,
    }
}

impl TestContext {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, T) {
        let (status, bytes) = self.send(method, uri, body).await;
        let parsed = serde_json::from_slice(&bytes)
            .unwrap_or_else(|e| panic!("Unexpected body {:?}: {e}", String::from_utf8_lossy(&bytes)));
        (status, parsed)
    }

    async fn create_card(&self, title: &str, status: &str) -> CardJson {
        let (status_code, card) = self
            .send_json::<CardJson>(
                Method::POST,
                "/api/v1/cards",
                Some(json!({
                    "title": title,
                    "description": "Explain the move rules",
                    "status": status,
                    "board_id": "main",
                })),
            )
            .await;
        assert_eq!(status_code, StatusCode::CREATED);
        card
    }

    async fn move_card(&self, card: &CardJson, new_status: &str) -> (StatusCode, Vec<u8>) {
        self.send(
            Method::POST,
            "/api/v1/cards/move",
            Some(json!({
                "card_id": card.id,
                "new_status": new_status,
                "updated_at": card.updated_at,
            })),
        )
        .await
    }
}

fn error_snapshot(status: StatusCode, bytes: &[u8]) -> ErrorSnapshot {
    ErrorSnapshot {
        status: status.as_u16(),
        body: serde_json::from_slice(bytes).unwrap(),
    }
}

#[tokio::test]
async fn can_create_a_card() {
    let ctx = setup();

    let card = ctx.create_card("Write docs", "TODO").await;

    assert_eq!(card.created_at, card.updated_at);
    assert_eq!(ctx.store.len().await, 1);
    assert_yaml_snapshot!(card, {
        ".id" => "[id]",
        ".created_at" => "[timestamp]",
        ".updated_at" => "[timestamp]",
    }, @r###"
    id: "[id]"
    title: Write docs
    description: Explain the move rules
    status: TODO
    board_id: main
    created_at: "[timestamp]"
    updated_at: "[timestamp]"
    "###);
}

#[tokio::test]
async fn rejects_card_without_title() {
    let ctx = setup();

    let (status, bytes) = ctx
        .send(
            Method::POST,
            "/api/v1/cards",
            Some(json!({
                "title": "  ",
                "description": "No title",
                "status": "BACKLOG",
                "board_id": "main",
            })),
        )
        .await;

    assert_yaml_snapshot!(error_snapshot(status, &bytes), @r###"
    status: 400
    body:
      error: VALIDATION_FAILED
      message: "Missing required field: title"
    "###);
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn can_list_cards_of_a_board() {
    let ctx = setup();
    ctx.create_card("one", "BACKLOG").await;
    ctx.create_card("two", "DONE").await;

    let (status, response) = ctx
        .send_json::<CardsResponse>(Method::GET, "/api/v1/cards?board_id=main", None)
        .await;
    let (_, other) = ctx
        .send_json::<CardsResponse>(Method::GET, "/api/v1/cards?board_id=other", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response.count, 2);
    assert_eq!(response.cards.len(), 2);
    assert_eq!(other.count, 0);
}

#[tokio::test]
async fn rejects_listing_without_board_id() {
    let ctx = setup();

    let (status, body) = ctx
        .send_json::<ErrorResponse>(Method::GET, "/api/v1/cards", None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "VALIDATION_FAILED");
}

#[tokio::test]
async fn returns_404_for_unknown_card() {
    let ctx = setup();
    let uri = format!("/api/v1/cards/{}", uuid::Uuid::new_v4());

    let (status, body) = ctx.send_json::<ErrorResponse>(Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.error, "NOT_FOUND");
}

#[tokio::test]
async fn can_move_a_card_forward() {
    let ctx = setup();
    let card = ctx.create_card("Ship it", "TODO").await;

    let (status, bytes) = ctx.move_card(&card, "DOING").await;

    assert_eq!(status, StatusCode::OK);
    let moved: CardJson = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(moved.status, CardStatus::Doing);
    assert!(moved.updated_at > card.updated_at);
    assert_eq!(moved.created_at, card.created_at);
}

#[tokio::test]
async fn rejects_move_that_skips_a_column() {
    let ctx = setup();
    let card = ctx.create_card("Ship it", "TODO").await;

    let (status, bytes) = ctx.move_card(&card, "DONE").await;

    assert_yaml_snapshot!(error_snapshot(status, &bytes), @r###"
    status: 422
    body:
      error: INVALID_TRANSITION
      message: Cannot move card from TODO to DONE
    "###);
}

#[tokio::test]
async fn rejects_move_with_stale_updated_at() {
    let ctx = setup();
    let mut card = ctx.create_card("Ship it", "TODO").await;
    card.updated_at -= Duration::seconds(1);

    let (status, bytes) = ctx.move_card(&card, "DOING").await;

    assert_eq!(status, StatusCode::CONFLICT);
    let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.error, "CONFLICT");
}

#[tokio::test]
async fn rejects_third_card_in_doing() {
    let ctx = setup();
    ctx.create_card("first", "DOING").await;
    ctx.create_card("second", "DOING").await;
    let third = ctx.create_card("third", "TODO").await;

    let (status, bytes) = ctx.move_card(&third, "DOING").await;

    assert_yaml_snapshot!(error_snapshot(status, &bytes), @r###"
    status: 422
    body:
      error: WIP_LIMIT_EXCEEDED
      message: Board main already has 2 cards in DOING
    "###);
}

#[tokio::test]
async fn can_update_title_only() {
    let ctx = setup();
    let card = ctx.create_card("Draft", "BACKLOG").await;
    let uri = format!("/api/v1/cards/{}", card.id);

    let (status, updated) = ctx
        .send_json::<CardJson>(Method::PUT, &uri, Some(json!({ "title": "Final" })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.description, card.description);
    assert_eq!(updated.status, CardStatus::Backlog);
    assert!(updated.updated_at > card.updated_at);
}

#[tokio::test]
async fn can_delete_a_card() {
    let ctx = setup();
    let card = ctx.create_card("Old", "DONE").await;
    let uri = format!("/api/v1/cards/{}", card.id);

    let (deleted, _) = ctx.send(Method::DELETE, &uri, None).await;
    let (fetched, _) = ctx.send(Method::GET, &uri, None).await;
    let (deleted_again, _) = ctx.send(Method::DELETE, &uri, None).await;

    assert_eq!(deleted, StatusCode::NO_CONTENT);
    assert_eq!(fetched, StatusCode::NOT_FOUND);
    assert_eq!(deleted_again, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn can_serve_openapi_document() {
    let ctx = setup();

    let (status, document) = ctx
        .send_json::<Value>(Method::GET, "/api-docs/openapi.json", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let paths = document["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/cards"));
    assert!(paths.contains_key("/api/v1/cards/move"));
    assert!(paths.contains_key("/api/v1/cards/{id}"));
}
