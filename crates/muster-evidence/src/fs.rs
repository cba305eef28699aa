//! [`FsEvidenceStore`] — filesystem implementation of
//! [`muster_core::store::EvidenceStore`].

use std::path::{Path, PathBuf};

use bytes::Bytes;
use muster_core::store::EvidenceStore;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Stores evidence blobs as files named by their SHA-256 content hash.
///
/// Hash naming makes `put` idempotent: re-uploading an identical capture
/// yields the same URL and writes nothing new.
#[derive(Clone)]
pub struct FsEvidenceStore {
  dir:      PathBuf,
  base_url: String,
}

impl FsEvidenceStore {
  /// Create a store rooted at `dir`, serving files below `base_url`.
  /// The directory is created if missing.
  pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self> {
    let dir = dir.into();
    std::fs::create_dir_all(&dir)?;
    Ok(Self {
      dir,
      base_url: base_url.into().trim_end_matches('/').to_owned(),
    })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn file_name(data: &[u8], content_type: &str) -> String {
    let ext = match content_type {
      "image/jpeg" | "image/jpg" => "jpg",
      "image/png" => "png",
      "image/webp" => "webp",
      _ => "bin",
    };
    let hash = Sha256::digest(data);
    format!("{}.{ext}", hex::encode(hash))
  }
}

impl EvidenceStore for FsEvidenceStore {
  type Error = Error;

  async fn put(&self, data: Bytes, content_type: &str) -> Result<String> {
    let name = Self::file_name(&data, content_type);
    let path = self.dir.join(&name);

    if tokio::fs::try_exists(&path).await? {
      return Ok(format!("{}/{name}", self.base_url));
    }

    // Write to a sibling temp file first so a crash never leaves a partial
    // blob under the final name.
    let tmp = self.dir.join(format!("{name}.tmp"));
    tokio::fs::write(&tmp, &data).await?;
    tokio::fs::rename(&tmp, &path).await?;

    Ok(format!("{}/{name}", self.base_url))
  }
}
