//! Person — an entry in the crew directory.
//!
//! Persons are created once by seed import and looked up by their scannable
//! code at check-in time. The core never deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A crew member known to the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  Uuid,
  /// Display name, e.g. "S2 M. Vallejos".
  pub name:       String,
  /// The unique scannable code printed on the person's badge.
  pub code:       String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::RosterStore::add_person`] and `upsert_person`.
/// The id and creation timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
  pub name: String,
  pub code: String,
}
