//! Attendance events — the fundamental unit of the Muster store.
//!
//! An event records that a person held a status at a point in time. Events
//! are append-only except for the same-day manual correction path, which
//! overwrites status and description in place (see `engine::manual_entry`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// The attendance status recorded by an event.
///
/// Closed enum: every `match` over it is exhaustive, so adding a variant is a
/// compile-time-visible change in the aggregation buckets, badge colours and
/// store encoding all at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Aboard,
  Ashore,
  Leave,
  Authorized,
  Commission,
  /// Date-ranged absence category (medical and similar).
  Medical,
}

impl Status {
  /// The discriminant string stored in the `status` column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Aboard => "aboard",
      Self::Ashore => "ashore",
      Self::Leave => "leave",
      Self::Authorized => "authorized",
      Self::Commission => "commission",
      Self::Medical => "medical",
    }
  }

  /// Parse the stored discriminant. Returns `None` for unknown strings so
  /// the store layer can surface its own decode error.
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "aboard" => Some(Self::Aboard),
      "ashore" => Some(Self::Ashore),
      "leave" => Some(Self::Leave),
      "authorized" => Some(Self::Authorized),
      "commission" => Some(Self::Commission),
      "medical" => Some(Self::Medical),
      _ => None,
    }
  }

  /// Human-readable name used in operation reply messages.
  pub fn label(&self) -> &'static str {
    match self {
      Self::Aboard => "ABOARD",
      Self::Ashore => "ASHORE",
      Self::Leave => "LEAVE",
      Self::Authorized => "AUTHORIZED",
      Self::Commission => "COMMISSION",
      Self::Medical => "MEDICAL",
    }
  }

  /// Display colour token for status badges.
  pub fn badge(&self) -> &'static str {
    match self {
      Self::Aboard => "green",
      Self::Ashore => "gray",
      Self::Leave => "blue",
      Self::Authorized => "yellow",
      Self::Commission => "purple",
      Self::Medical => "red",
    }
  }

  /// All variants, in bucket display order.
  pub const ALL: [Status; 6] = [
    Status::Aboard,
    Status::Ashore,
    Status::Leave,
    Status::Authorized,
    Status::Commission,
    Status::Medical,
  ];
}

// ─── AttendanceEvent ─────────────────────────────────────────────────────────

/// A recorded status for a person at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceEvent {
  pub event_id:     Uuid,
  pub person_id:    Uuid,
  pub status:       Status,
  /// Event time. Stamped by the store at insert unless the engine pins an
  /// explicit instant (ranged entries).
  pub timestamp:    DateTime<Utc>,
  /// URL of the photographic evidence captured at a QR check-in.
  pub evidence_url: Option<String>,
  /// Free-text reason supplied with manual entries.
  pub description:  Option<String>,
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// Input to the event-writing methods of
/// [`crate::store::RosterStore`]. The event id is always assigned by the
/// store; `timestamp` defaults to insert time when `None`.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub person_id:    Uuid,
  pub status:       Status,
  pub timestamp:    Option<DateTime<Utc>>,
  pub evidence_url: Option<String>,
  pub description:  Option<String>,
}

impl NewEvent {
  /// Convenience constructor with all optional fields unset.
  pub fn new(person_id: Uuid, status: Status) -> Self {
    Self {
      person_id,
      status,
      timestamp: None,
      evidence_url: None,
      description: None,
    }
  }
}
