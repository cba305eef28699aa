//! The `RosterStore` and `EvidenceStore` traits.
//!
//! `RosterStore` is implemented by storage backends (e.g.
//! `muster-store-sqlite`). The engine and the API depend on these
//! abstractions, not on any concrete backend.

use std::future::Future;

use bytes::Bytes;
use uuid::Uuid;

use crate::{
  event::{AttendanceEvent, NewEvent, Status},
  person::{NewPerson, Person},
  window::DayWindow,
};

// ─── Conditional-write outcomes ──────────────────────────────────────────────

/// Result of the atomic check-and-insert behind a QR check-in.
#[derive(Debug, Clone)]
pub enum CheckinOutcome {
  /// No aboard event existed in the window; a new event was inserted.
  Recorded(AttendanceEvent),
  /// The person's latest event in the window is already `Aboard`; nothing
  /// was written. Carries the existing event.
  AlreadyAboard(AttendanceEvent),
}

/// Result of the atomic same-day manual correction.
#[derive(Debug, Clone)]
pub enum CorrectionOutcome {
  /// An event already existed in the window; its status and description were
  /// overwritten in place. Timestamp and evidence URL are untouched.
  Updated(AttendanceEvent),
  /// No event existed in the window; a fresh one was inserted at now.
  Created(AttendanceEvent),
}

// ─── RosterStore ─────────────────────────────────────────────────────────────

/// Abstraction over a Muster attendance store backend.
///
/// The duplicate-today check and the same-day correction are expressed as
/// single conditional-write methods so backends can make them atomic; the
/// engine never does an application-level read-then-write for either.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Create and persist a new person. Fails if the code is already taken.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Insert a person, or update the name of the existing person with the
  /// same code. Used by seed import, which must be re-runnable.
  fn upsert_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by exact scannable-code match.
  fn find_person_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// List the whole directory, ordered by name.
  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Persist one event. `timestamp` defaults to now when unset.
  fn insert_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<AttendanceEvent, Self::Error>> + Send + '_;

  /// Persist a batch of events in a single transaction — either every row
  /// lands or none do. Used for ranged manual entries.
  fn insert_events(
    &self,
    inputs: Vec<NewEvent>,
  ) -> impl Future<Output = Result<Vec<AttendanceEvent>, Self::Error>> + Send + '_;

  /// All events with a timestamp inside `window`, across all persons,
  /// sorted descending by timestamp.
  fn events_in_window(
    &self,
    window: DayWindow,
  ) -> impl Future<Output = Result<Vec<AttendanceEvent>, Self::Error>> + Send + '_;

  /// The most recent event for `person_id` inside `window`, if any.
  fn latest_event_in_window(
    &self,
    person_id: Uuid,
    window: DayWindow,
  ) -> impl Future<Output = Result<Option<AttendanceEvent>, Self::Error>> + Send + '_;

  /// Delete every event whose timestamp falls inside `window`, across all
  /// persons. Returns the number of rows removed. Irreversible.
  fn delete_events_in_window(
    &self,
    window: DayWindow,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Atomic conditional writes ─────────────────────────────────────────

  /// Insert `input` unless the person's latest event inside `window` is
  /// already `Aboard`. Check and insert happen in one transaction.
  fn record_checkin(
    &self,
    input: NewEvent,
    window: DayWindow,
  ) -> impl Future<Output = Result<CheckinOutcome, Self::Error>> + Send + '_;

  /// Overwrite status and description of the person's latest event inside
  /// `window`, or insert a fresh event at now if none exists. Check and
  /// write happen in one transaction; original timestamp and evidence URL
  /// of an updated event are preserved.
  fn correct_today(
    &self,
    person_id: Uuid,
    status: Status,
    description: Option<String>,
    window: DayWindow,
  ) -> impl Future<Output = Result<CorrectionOutcome, Self::Error>> + Send + '_;
}

// ─── EvidenceStore ───────────────────────────────────────────────────────────

/// Abstraction over the blob store holding check-in photographs.
///
/// Called at most once per successful check-in; a failure aborts the
/// check-in before any event row is written, so no retry logic lives here.
pub trait EvidenceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `data` and return a retrievable URL.
  fn put<'a>(
    &'a self,
    data: Bytes,
    content_type: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
