//! Handler for `POST /manual`.
//!
//! Body: `{"person_id": "...", "status": "leave", "description": "...",
//! "start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD"}` — description and
//! the date pair optional. Always answers 200 with an [`OpReply`].

use std::sync::Arc;

use axum::{Json, extract::State};
use muster_core::{
  engine::Engine,
  event::Status,
  store::{EvidenceStore, RosterStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{OpReply, demote};

#[derive(Debug, Deserialize)]
pub struct ManualBody {
  pub person_id:   Uuid,
  pub status:      Status,
  pub description: Option<String>,
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
}

pub async fn handler<S, E>(
  State(engine): State<Arc<Engine<S, E>>>,
  Json(body): Json<ManualBody>,
) -> Json<OpReply>
where
  S: RosterStore,
  E: EvidenceStore,
{
  let result = engine
    .manual_entry(
      body.person_id,
      body.status,
      body.description,
      body.start_date.as_deref(),
      body.end_date.as_deref(),
    )
    .await;

  match result {
    Ok(receipt) => Json(OpReply::ok(receipt.message)),
    Err(err) => Json(demote(err)),
  }
}
