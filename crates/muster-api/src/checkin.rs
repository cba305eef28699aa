//! Handler for `POST /checkin`.
//!
//! Body: `{"code": "...", "evidence": "data:image/jpeg;base64,..."}` with
//! `evidence` optional. Always answers 200 with an [`OpReply`].

use std::sync::Arc;

use axum::{Json, extract::State};
use muster_core::{
  Error as CoreError,
  engine::{Engine, EvidencePayload},
  store::{EvidenceStore, RosterStore},
};
use muster_evidence::data_url;
use serde::Deserialize;

use crate::{OpReply, demote};

#[derive(Debug, Deserialize)]
pub struct CheckinBody {
  pub code:     String,
  /// Base64 data URL of the camera capture, when one was taken.
  pub evidence: Option<String>,
}

pub async fn handler<S, E>(
  State(engine): State<Arc<Engine<S, E>>>,
  Json(body): Json<CheckinBody>,
) -> Json<OpReply>
where
  S: RosterStore,
  E: EvidenceStore,
{
  let payload = match body.evidence.as_deref() {
    Some(raw) => match data_url::decode(raw) {
      Ok((data, content_type)) => Some(EvidencePayload { data, content_type }),
      Err(e) => {
        return Json(demote(CoreError::InvalidInput(format!("evidence: {e}"))));
      }
    },
    None => None,
  };

  match engine.check_in(&body.code, payload).await {
    Ok(receipt) => Json(OpReply::ok(receipt.message)),
    Err(err) => Json(demote(err)),
  }
}
