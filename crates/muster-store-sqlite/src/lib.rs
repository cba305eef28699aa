//! SQLite backend for the Muster attendance store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. The duplicate-check-in guard and
//! the same-day correction run inside single transactions on that thread,
//! which is what makes them safe against concurrent requests.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
