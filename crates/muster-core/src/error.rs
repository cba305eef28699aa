//! Error types for `muster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("{name} is already aboard today")]
  DuplicateCheckIn { name: String },

  #[error("invalid date range: {0}")]
  InvalidRange(String),

  #[error("evidence storage error: {0}")]
  Evidence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend store error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// Wrap an evidence uploader error.
  pub fn evidence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Evidence(Box::new(err))
  }

  /// The message shown to an operator in a `{success: false}` reply.
  ///
  /// Infrastructure failures are demoted to a generic message; the detail is
  /// logged at the operation boundary, not surfaced to the caller.
  pub fn user_message(&self) -> String {
    match self {
      Self::Store(_) | Self::Evidence(_) => {
        "internal error while saving the record".to_string()
      }
      other => other.to_string(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
