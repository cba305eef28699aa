//! JSON REST API for Muster.
//!
//! Exposes an axum [`Router`] backed by any
//! [`muster_core::store::RosterStore`] and
//! [`muster_core::store::EvidenceStore`] via the resolution engine. Auth,
//! TLS, and transport concerns are the caller's responsibility.
//!
//! Mutating operations never surface an error status: the engine's failures
//! are demoted to a `{success:false, message}` reply at this boundary, with
//! the detail logged for operators.

pub mod checkin;
pub mod error;
pub mod manual;
pub mod persons;
pub mod reset;
pub mod roster;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use muster_core::{
  Error as CoreError,
  engine::Engine,
  store::{EvidenceStore, RosterStore},
  window::DEFAULT_UTC_OFFSET_HOURS,
};
use serde::{Deserialize, Serialize};

pub use error::ApiError;

// ─── Operation replies ───────────────────────────────────────────────────────

/// The `{success, message}` shape every mutating operation answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpReply {
  pub success: bool,
  pub message: String,
}

impl OpReply {
  pub fn ok(message: impl Into<String>) -> Self {
    Self { success: true, message: message.into() }
  }

  pub fn fail(message: impl Into<String>) -> Self {
    Self { success: false, message: message.into() }
  }
}

/// Convert an engine error into a failure reply, logging infrastructure
/// failures at `error` and operator mistakes at `warn`.
pub fn demote(err: CoreError) -> OpReply {
  match &err {
    CoreError::Store(_) | CoreError::Evidence(_) => {
      tracing::error!(error = %err, "operation failed");
    }
    _ => {
      tracing::warn!(error = %err, "operation rejected");
    }
  }
  OpReply::fail(err.user_message())
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `MUSTER_*` environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  #[serde(default = "default_evidence_dir")]
  pub evidence_dir:      PathBuf,
  #[serde(default = "default_evidence_base_url")]
  pub evidence_base_url: String,
  /// Whole-hour reference-timezone offset east of UTC.
  #[serde(default = "default_utc_offset_hours")]
  pub utc_offset_hours:  i32,
}

fn default_host() -> String {
  "127.0.0.1".into()
}
fn default_port() -> u16 {
  8737
}
fn default_store_path() -> PathBuf {
  PathBuf::from("muster.db")
}
fn default_evidence_dir() -> PathBuf {
  PathBuf::from("evidence")
}
fn default_evidence_base_url() -> String {
  "/evidence".into()
}
fn default_utc_offset_hours() -> i32 {
  DEFAULT_UTC_OFFSET_HOURS
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, E>(engine: Arc<Engine<S, E>>) -> Router<()>
where
  S: RosterStore + 'static,
  E: EvidenceStore + 'static,
{
  Router::new()
    .route("/checkin", post(checkin::handler::<S, E>))
    .route("/manual", post(manual::handler::<S, E>))
    .route("/reset", post(reset::handler::<S, E>))
    .route("/roster", get(roster::handler::<S, E>))
    .route("/persons", get(persons::list::<S, E>).post(persons::create::<S, E>))
    .with_state(engine)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use muster_core::window::reference_offset;
  use muster_evidence::FsEvidenceStore;
  use muster_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_engine() -> Arc<Engine<SqliteStore, FsEvidenceStore>> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let dir = std::env::temp_dir()
      .join("muster-api-tests")
      .join(Uuid::new_v4().to_string());
    let evidence = FsEvidenceStore::new(dir, "/evidence").unwrap();
    Arc::new(Engine::new(
      Arc::new(store),
      Some(Arc::new(evidence)),
      reference_offset(DEFAULT_UTC_OFFSET_HOURS).unwrap(),
    ))
  }

  async fn request(
    engine: Arc<Engine<SqliteStore, FsEvidenceStore>>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(engine)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn enroll(
    engine: &Arc<Engine<SqliteStore, FsEvidenceStore>>,
    name: &str,
    code: &str,
  ) -> Uuid {
    let person = engine.enroll(name, code).await.unwrap();
    person.person_id
  }

  #[tokio::test]
  async fn checkin_success_then_duplicate_reply() {
    let engine = make_engine().await;
    enroll(&engine, "Alice", "663898-8").await;

    let (status, body) = request(
      engine.clone(),
      "POST",
      "/checkin",
      Some(json!({"code": "663898-8"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["message"].as_str().unwrap().contains("Alice"));

    let (status, body) = request(
      engine,
      "POST",
      "/checkin",
      Some(json!({"code": "663898-8"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("already aboard"));
  }

  #[tokio::test]
  async fn checkin_with_evidence_data_url() {
    let engine = make_engine().await;
    enroll(&engine, "Alice", "a").await;

    let capture = format!(
      "data:image/jpeg;base64,{}",
      B64.encode([0xffu8, 0xd8, 0xff, 0xe0])
    );
    let (status, body) = request(
      engine,
      "POST",
      "/checkin",
      Some(json!({"code": "a", "evidence": capture})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
  }

  #[tokio::test]
  async fn checkin_with_malformed_evidence_fails_cleanly() {
    let engine = make_engine().await;
    enroll(&engine, "Alice", "a").await;

    let (status, body) = request(
      engine.clone(),
      "POST",
      "/checkin",
      Some(json!({"code": "a", "evidence": "data:image/jpeg;base64"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));

    // The rejection wrote nothing; a clean scan still succeeds.
    let (_, body) =
      request(engine, "POST", "/checkin", Some(json!({"code": "a"}))).await;
    assert_eq!(body["success"], json!(true));
  }

  #[tokio::test]
  async fn manual_entry_replies_and_partial_range_is_rejected() {
    let engine = make_engine().await;
    let id = enroll(&engine, "Alice", "a").await;

    let (status, body) = request(
      engine.clone(),
      "POST",
      "/manual",
      Some(json!({"person_id": id, "status": "leave", "description": "dentist"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["message"].as_str().unwrap().contains("LEAVE"));

    let (status, body) = request(
      engine,
      "POST",
      "/manual",
      Some(json!({
        "person_id": id,
        "status": "commission",
        "start_date": "2024-01-01"
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
  }

  #[tokio::test]
  async fn reset_reports_deleted_count() {
    let engine = make_engine().await;
    let id = enroll(&engine, "Alice", "a").await;

    request(
      engine.clone(),
      "POST",
      "/manual",
      Some(json!({
        "person_id": id,
        "status": "medical",
        "start_date": "2024-09-01",
        "end_date": "2024-09-02"
      })),
    )
    .await;

    let (status, body) = request(
      engine,
      "POST",
      "/reset",
      Some(json!({"date": "2024-09-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["message"].as_str().unwrap().contains("1 event(s)"));
  }

  #[tokio::test]
  async fn roster_returns_counts_and_unmarked() {
    let engine = make_engine().await;
    enroll(&engine, "Alice", "a").await;
    enroll(&engine, "Bob", "b").await;

    request(engine.clone(), "POST", "/checkin", Some(json!({"code": "a"})))
      .await;

    let (status, body) = request(engine, "GET", "/roster", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["aboard"], json!(1));
    assert_eq!(body["unmarked"], json!(1));
    assert_eq!(body["resolved"].as_array().unwrap().len(), 2);
    // The day's raw event history rides along with the census.
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["status"], json!("aboard"));
  }

  #[tokio::test]
  async fn roster_rejects_malformed_date() {
    let engine = make_engine().await;
    let (status, _) =
      request(engine, "GET", "/roster?date=not-a-date", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn persons_create_and_list() {
    let engine = make_engine().await;

    let (status, body) = request(
      engine.clone(),
      "POST",
      "/persons",
      Some(json!({"name": "C2 R. Olivares", "code": "612311-8"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], json!("C2 R. Olivares"));

    let (status, body) = request(engine, "GET", "/persons", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
  }
}
