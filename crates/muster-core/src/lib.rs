//! Core types and trait definitions for the Muster attendance store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod engine;
pub mod error;
pub mod event;
pub mod person;
pub mod roster;
pub mod store;
pub mod window;

pub use error::{Error, Result};
