//! HTTP front for the contact merge engine.
//!
//! Exposes an axum [`Router`] that accepts contact webhooks and serves the
//! merged records, backed by any [`RecordStore`].

pub mod config;
pub mod error;
pub mod handlers;

pub use config::{ConfigError, ServerConfig};
pub use error::Error;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use canon_core::{engine::MergeEngine, store::RecordStore};
use tower_http::trace::TraceLayer;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub engine: Arc<MergeEngine<S>>,
  pub config: Arc<ServerConfig>,
}

impl<S: RecordStore> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    Self {
      engine: Arc::new(MergeEngine::new(store)),
      config: Arc::new(config),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      engine: Arc::clone(&self.engine),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the webhook server.
///
/// | Method | Path | Notes |
/// |--------|------|-------|
/// | `POST` | `/webhook` | Body: contact fragment JSON; returns the merged record |
/// | `GET`  | `/contacts/{phone}` | Any phone spelling; 404 if not stored |
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + 'static,
{
  let body_limit = state.config.body_limit;
  Router::new()
    .route("/webhook",          post(handlers::webhook::receive::<S>))
    .route("/contacts/{phone}", get(handlers::contacts::get_one::<S>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use canon_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(
      Arc::new(store),
      ServerConfig {
        host:       "127.0.0.1".to_string(),
        port:       5000,
        store_path: PathBuf::from(":memory:"),
        body_limit: 64 * 1024,
      },
    )
  }

  async fn send(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   &str,
  ) -> (StatusCode, String) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    let resp   = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
  }

  async fn post_webhook(state: AppState<SqliteStore>, payload: Value) -> (StatusCode, Value) {
    let (status, body) = send(state, "POST", "/webhook", &payload.to_string()).await;
    (status, serde_json::from_str(&body).unwrap())
  }

  fn first_event() -> Value {
    json!({
      "primary_data": { "customer_name": "Ana Silva", "mobile_1": "11987654321" },
      "platforms_to_add": [{ "platform": "wa", "platform_id": "123" }],
      "tags_to_add": [{ "tag_name": "vip", "tag_added_at": "t1" }],
      "conversations_to_add": [{ "message_id": "m1", "message_content": "hi" }],
    })
  }

  // ── POST /webhook ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn first_event_creates_record() {
    let state = make_state().await;
    let (status, body) = post_webhook(state.clone(), first_event()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "5511987654321");
    assert_eq!(body["phone_number"], "5511987654321");
    assert_eq!(body["number_invalid"], false);
    assert_eq!(body["first_name"], "Ana");
    assert_eq!(body["last_name"], "Silva");
    assert_eq!(body["id_in_platforms"], json!([{ "platform": "wa", "id_in_platform": "123" }]));
    assert_eq!(body["tags"], json!([{ "tag_name": "vip", "tag_add_at": "t1" }]));
    assert_eq!(body["conversation_history"][0]["message_id"], "m1");
    assert_eq!(body["conversation_history"][0]["message_content"], "hi");
    assert_eq!(body["conversation_history"][0]["phone_sender"], "");
    assert_eq!(body["created_at"], body["updated_at"]);

    assert_eq!(state.engine.store().count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn response_keys_keep_document_order() {
    let state = make_state().await;
    let (_, body) = send(state, "POST", "/webhook", &first_event().to_string()).await;
    let order = [
      "\"full_name\"",
      "\"first_name\"",
      "\"last_name\"",
      "\"phone_number\"",
      "\"number_invalid\"",
      "\"id_in_platforms\"",
      "\"tags\"",
      "\"conversation_history\"",
      "\"id\"",
      "\"created_at\"",
      "\"updated_at\"",
    ];
    let positions: Vec<usize> = order.iter().map(|k| body.find(k).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{body}");
  }

  #[tokio::test]
  async fn second_event_merges_into_first() {
    let state = make_state().await;
    let (_, first) = post_webhook(state.clone(), first_event()).await;

    let (status, second) = post_webhook(
      state.clone(),
      json!({
        "primary_data": { "customer_name": "Someone Else", "mobile_3": "+55 11 99876-54321" },
        "platforms_to_add": [{ "platform": "wa", "platform_id": "123" }],
        "tags_to_add": [{ "tag_name": "vip", "tag_add_at": "t2" }],
        "conversations_to_add": [
          { "message_id": "m1", "message_content": "overwritten?" },
          { "message_id": "m2", "message_content": "again" },
        ],
      }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], "5511987654321");
    assert_eq!(second["full_name"], "Ana Silva");
    assert_eq!(second["id_in_platforms"], first["id_in_platforms"]);
    assert_eq!(second["tags"].as_array().unwrap().len(), 2);

    let history = second["conversation_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["message_content"], "hi");
    assert_eq!(history[1]["message_id"], "m2");

    assert_eq!(second["created_at"], first["created_at"]);
    assert!(second["updated_at"].as_str().unwrap() >= first["updated_at"].as_str().unwrap());
    assert_eq!(state.engine.store().count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn fragment_without_phone_is_rejected_and_not_stored() {
    let state = make_state().await;
    let (status, body) = post_webhook(
      state.clone(),
      json!({
        "primary_data": { "customer_name": "Ana", "mobile_1": "", "mobile_2": null },
        "conversations_to_add": [{ "message_id": "m1" }],
      }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert_eq!(state.engine.store().count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn malformed_json_is_bad_request() {
    let state = make_state().await;
    let (status, body) = send(state.clone(), "POST", "/webhook", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].is_string());

    let (status, _) = send(
      state,
      "POST",
      "/webhook",
      r#"{"primary_data":{"mobile_1":"11987654321"},"platforms_to_add":[{"platform":{}}]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn oversized_body_is_refused() {
    let state = make_state().await;
    let padding = "x".repeat(128 * 1024);
    let payload = json!({
      "primary_data": { "customer_name": padding, "mobile_1": "11987654321" },
    });
    let (status, body) = send(state.clone(), "POST", "/webhook", &payload.to_string()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{body}");
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].is_string());
    assert_eq!(state.engine.store().count().await.unwrap(), 0);
  }

  // ── GET /contacts/{phone} ────────────────────────────────────────────────────

  #[tokio::test]
  async fn stored_contact_is_found_by_any_spelling() {
    let state = make_state().await;
    post_webhook(state.clone(), first_event()).await;

    for phone in ["5511987654321", "11987654321", "%2B55%20(11)%2098765-4321"] {
      let (status, body) = send(state.clone(), "GET", &format!("/contacts/{phone}"), "").await;
      assert_eq!(status, StatusCode::OK, "{phone}");
      let body: Value = serde_json::from_str(&body).unwrap();
      assert_eq!(body["id"], "5511987654321");
    }
  }

  #[tokio::test]
  async fn unknown_contact_is_404() {
    let state = make_state().await;
    let (status, body) = send(state, "GET", "/contacts/21912345678", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("5521912345678"), "{body}");
  }
}
