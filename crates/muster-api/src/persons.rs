//! Handlers for `/persons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons` | Whole directory, ordered by name |
//! | `POST` | `/persons` | Body: `{"name":"...","code":"..."}`; upsert by code |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use muster_core::{
  engine::Engine,
  person::Person,
  store::{EvidenceStore, RosterStore},
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /persons`
pub async fn list<S, E>(
  State(engine): State<Arc<Engine<S, E>>>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: RosterStore,
  E: EvidenceStore,
{
  Ok(Json(engine.persons().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
  pub code: String,
}

/// `POST /persons` — returns 201 + the stored [`Person`]. Re-posting an
/// existing code refreshes the name instead of failing, so seed imports can
/// be re-run.
pub async fn create<S, E>(
  State(engine): State<Arc<Engine<S, E>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
  E: EvidenceStore,
{
  let person = engine.enroll(&body.name, &body.code).await?;
  Ok((StatusCode::CREATED, Json(person)))
}
