//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Only the read path surfaces HTTP error statuses; mutating operations
//! answer 200 with a `{success:false, message}` reply instead (see
//! [`crate::OpReply`]).

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use muster_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by a read-path API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CoreError> for ApiError {
  fn from(err: CoreError) -> Self {
    match err {
      CoreError::NotFound(m) => Self::NotFound(m),
      CoreError::InvalidInput(m) | CoreError::InvalidRange(m) => {
        Self::BadRequest(m)
      }
      CoreError::DuplicateCheckIn { name } => {
        Self::BadRequest(format!("{name} is already aboard today"))
      }
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "read-path store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
