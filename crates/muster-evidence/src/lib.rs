//! Evidence storage for QR check-in photographs.
//!
//! The capture arrives from the scanner as a base64 data URL; [`data_url`]
//! decodes it and [`FsEvidenceStore`] persists the bytes on disk under a
//! content-hash filename, returning the URL the roster will display. No
//! binary data ever lands in the database.

pub mod data_url;
mod fs;

pub mod error;

pub use error::{Error, Result};
pub use fs::FsEvidenceStore;
