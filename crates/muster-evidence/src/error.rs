//! Error type for `muster-evidence`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed data URL: {0}")]
  MalformedDataUrl(String),

  #[error("base64 decode error: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
