//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed-width microseconds
//! and a `Z` suffix so lexicographic comparison matches instant ordering.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use muster_core::{
  event::{AttendanceEvent, Status},
  person::Person,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn encode_status(status: Status) -> &'static str {
  status.as_str()
}

pub fn decode_status(s: &str) -> Result<Status> {
  Status::parse(s).ok_or_else(|| Error::UnknownStatus(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:  String,
  pub name:       String,
  pub code:       String,
  pub created_at: String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:  decode_uuid(&self.person_id)?,
      name:       self.name,
      code:       self.code,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:     String,
  pub person_id:    String,
  pub status:       String,
  pub timestamp:    String,
  pub evidence_url: Option<String>,
  pub description:  Option<String>,
}

impl RawEvent {
  pub fn into_event(self) -> Result<AttendanceEvent> {
    Ok(AttendanceEvent {
      event_id:     decode_uuid(&self.event_id)?,
      person_id:    decode_uuid(&self.person_id)?,
      status:       decode_status(&self.status)?,
      timestamp:    decode_dt(&self.timestamp)?,
      evidence_url: self.evidence_url,
      description:  self.description,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_encode_fixed_width() {
    let whole = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
    let sub = whole + chrono::Duration::microseconds(500_000);
    let a = encode_dt(whole);
    let b = encode_dt(sub);
    assert_eq!(a.len(), b.len());
    // Lexicographic order must match instant order.
    assert!(a < b);
    assert_eq!(decode_dt(&a).unwrap(), whole);
    assert_eq!(decode_dt(&b).unwrap(), sub);
  }
}
