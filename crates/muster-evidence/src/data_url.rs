//! Decoding of the `data:image/...;base64,` payloads produced by the
//! scanner's camera capture.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;

use crate::{Error, Result};

/// The content type assumed for a bare base64 payload with no data-URL
/// header. The capture pipeline only ever produces JPEG.
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Decode a data URL (or bare base64 string) into bytes plus content type.
///
/// Accepted forms:
/// - `data:image/jpeg;base64,<payload>`
/// - `<payload>` (bare base64, assumed JPEG)
pub fn decode(input: &str) -> Result<(Bytes, String)> {
  let (content_type, payload) = match input.strip_prefix("data:") {
    Some(rest) => {
      let (meta, payload) = rest.split_once(',').ok_or_else(|| {
        Error::MalformedDataUrl("missing ',' separator".into())
      })?;
      let content_type = meta.strip_suffix(";base64").ok_or_else(|| {
        Error::MalformedDataUrl(format!("not base64-encoded: {meta:?}"))
      })?;
      if content_type.is_empty() {
        return Err(Error::MalformedDataUrl("empty content type".into()));
      }
      (content_type.to_owned(), payload)
    }
    None => (DEFAULT_CONTENT_TYPE.to_owned(), input),
  };

  let bytes = B64.decode(payload.trim())?;
  Ok((Bytes::from(bytes), content_type))
}
