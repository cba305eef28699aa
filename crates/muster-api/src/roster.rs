//! Handler for `GET /roster` — the daily census read path.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use muster_core::{
  engine::Engine,
  roster::DailyRoster,
  store::{EvidenceStore, RosterStore},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RosterParams {
  /// `YYYY-MM-DD`; defaults to today in the reference timezone.
  pub date: Option<String>,
}

/// `GET /roster[?date=YYYY-MM-DD]`
pub async fn handler<S, E>(
  State(engine): State<Arc<Engine<S, E>>>,
  Query(params): Query<RosterParams>,
) -> Result<Json<DailyRoster>, ApiError>
where
  S: RosterStore,
  E: EvidenceStore,
{
  let roster = engine.roster(params.date.as_deref()).await?;
  Ok(Json(roster))
}
