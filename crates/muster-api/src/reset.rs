//! Handler for `POST /reset` — the administrative day purge.
//!
//! Body: `{"date": "YYYY-MM-DD"}`. Irreversible; any confirmation dialog is
//! the caller's responsibility. Always answers 200 with an [`OpReply`]
//! whose message reports the deleted row count.

use std::sync::Arc;

use axum::{Json, extract::State};
use muster_core::{
  engine::Engine,
  store::{EvidenceStore, RosterStore},
};
use serde::Deserialize;

use crate::{OpReply, demote};

#[derive(Debug, Deserialize)]
pub struct ResetBody {
  pub date: String,
}

pub async fn handler<S, E>(
  State(engine): State<Arc<Engine<S, E>>>,
  Json(body): Json<ResetBody>,
) -> Json<OpReply>
where
  S: RosterStore,
  E: EvidenceStore,
{
  match engine.reset_day(&body.date).await {
    Ok(receipt) => Json(OpReply::ok(receipt.message)),
    Err(err) => Json(demote(err)),
  }
}
