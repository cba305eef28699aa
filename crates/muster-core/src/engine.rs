//! The attendance resolution engine.
//!
//! Turns check-in and manual-entry requests into event writes, expands date
//! ranges into per-day events, and serves the daily roster read path. The
//! engine owns no connections; it is constructed over a [`RosterStore`] and
//! an optional [`EvidenceStore`] so tests can substitute fakes.

use std::sync::Arc;

use bytes::Bytes;
use chrono::FixedOffset;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error, Result,
  event::{NewEvent, Status},
  person::{NewPerson, Person},
  roster::{DailyRoster, resolve_day},
  store::{CheckinOutcome, CorrectionOutcome, EvidenceStore, RosterStore},
  window::{self, DayWindow},
};

// ─── Inputs and receipts ─────────────────────────────────────────────────────

/// A decoded photographic capture accompanying a QR check-in.
#[derive(Debug, Clone)]
pub struct EvidencePayload {
  pub data:         Bytes,
  pub content_type: String,
}

/// Successful check-in result.
#[derive(Debug, Clone)]
pub struct CheckinReceipt {
  pub person:  Person,
  pub event:   crate::event::AttendanceEvent,
  pub message: String,
}

/// Successful manual-entry result.
#[derive(Debug, Clone)]
pub struct ManualReceipt {
  pub person:  Person,
  pub status:  Status,
  /// Number of calendar days written (1 for the single-day path).
  pub days:    u64,
  pub message: String,
}

/// Successful day-reset result.
#[derive(Debug, Clone)]
pub struct ResetReceipt {
  pub date:    chrono::NaiveDate,
  pub deleted: u64,
  pub message: String,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The attendance resolution engine.
///
/// `S` is the event/person store; `E` the blob store for check-in evidence.
/// `offset` is the organisation's fixed reference timezone, used for every
/// calendar-day boundary the engine computes.
pub struct Engine<S, E> {
  store:    Arc<S>,
  evidence: Option<Arc<E>>,
  offset:   FixedOffset,
}

impl<S, E> Engine<S, E>
where
  S: RosterStore,
  E: EvidenceStore,
{
  pub fn new(store: Arc<S>, evidence: Option<Arc<E>>, offset: FixedOffset) -> Self {
    Self { store, evidence, offset }
  }

  pub fn offset(&self) -> FixedOffset {
    self.offset
  }

  // ── Check-in ──────────────────────────────────────────────────────────

  /// Resolve a scanned code into at most one new `Aboard` event.
  ///
  /// Exactly one event row is written on success, plus at most one blob.
  /// Nothing is written when the code is unknown or the person is already
  /// aboard today.
  pub async fn check_in(
    &self,
    code: &str,
    evidence: Option<EvidencePayload>,
  ) -> Result<CheckinReceipt> {
    let code = code.trim();
    if code.is_empty() {
      return Err(Error::InvalidInput("empty check-in code".into()));
    }

    let person = self
      .store
      .find_person_by_code(code)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("no person with code {code:?}")))?;

    let window = DayWindow::today(self.offset);

    // Advisory duplicate check before paying for the blob upload. The
    // authoritative guard is the conditional write below.
    if evidence.is_some() {
      let latest = self
        .store
        .latest_event_in_window(person.person_id, window)
        .await
        .map_err(Error::store)?;
      if latest.is_some_and(|e| e.status == Status::Aboard) {
        return Err(Error::DuplicateCheckIn { name: person.name });
      }
    }

    let evidence_url = match evidence {
      Some(payload) => {
        let uploader = self.evidence.as_ref().ok_or_else(|| {
          Error::InvalidInput(
            "evidence supplied but no evidence storage is configured".into(),
          )
        })?;
        let url = uploader
          .put(payload.data, &payload.content_type)
          .await
          .map_err(Error::evidence)?;
        Some(url)
      }
      None => None,
    };

    let mut input = NewEvent::new(person.person_id, Status::Aboard);
    input.evidence_url = evidence_url;

    match self
      .store
      .record_checkin(input, window)
      .await
      .map_err(Error::store)?
    {
      CheckinOutcome::Recorded(event) => {
        info!(person = %person.name, "check-in recorded");
        Ok(CheckinReceipt {
          message: format!("Welcome aboard, {}!", person.name),
          person,
          event,
        })
      }
      CheckinOutcome::AlreadyAboard(_) => {
        Err(Error::DuplicateCheckIn { name: person.name })
      }
    }
  }

  // ── Manual entry ──────────────────────────────────────────────────────

  /// Set or correct a person's status, optionally over a date range.
  ///
  /// With both dates present, one event per calendar day (inclusive) is
  /// written as a single atomic batch, each pinned to the neutral mid-day
  /// instant. With no dates, the latest same-day event is overwritten in
  /// place, or a fresh event is created at now. A partial range is
  /// rejected.
  pub async fn manual_entry(
    &self,
    person_id: Uuid,
    status: Status,
    description: Option<String>,
    start_date: Option<&str>,
    end_date: Option<&str>,
  ) -> Result<ManualReceipt> {
    let person = self
      .store
      .get_person(person_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("no person with id {person_id}")))?;

    match (start_date, end_date) {
      (None, None) => self.correct_single_day(person, status, description).await,
      (Some(start), Some(end)) => {
        self.write_range(person, status, description, start, end).await
      }
      _ => Err(Error::InvalidRange(
        "start and end dates must be supplied together".into(),
      )),
    }
  }

  async fn correct_single_day(
    &self,
    person: Person,
    status: Status,
    description: Option<String>,
  ) -> Result<ManualReceipt> {
    let window = DayWindow::today(self.offset);
    let outcome = self
      .store
      .correct_today(person.person_id, status, description, window)
      .await
      .map_err(Error::store)?;

    let message = match &outcome {
      CorrectionOutcome::Updated(_) => {
        format!("Status for {} corrected to {}.", person.name, status.label())
      }
      CorrectionOutcome::Created(_) => {
        format!("Status for {} set to {}.", person.name, status.label())
      }
    };
    info!(person = %person.name, status = status.as_str(), "manual entry");

    Ok(ManualReceipt { person, status, days: 1, message })
  }

  async fn write_range(
    &self,
    person: Person,
    status: Status,
    description: Option<String>,
    start: &str,
    end: &str,
  ) -> Result<ManualReceipt> {
    let start = window::parse_date(start)?;
    let end = window::parse_date(end)?;
    if start > end {
      return Err(Error::InvalidRange(format!(
        "start {start} is after end {end}"
      )));
    }

    let mut inputs = Vec::new();
    let mut day = start;
    loop {
      let mut input = NewEvent::new(person.person_id, status);
      input.timestamp = Some(DayWindow::for_date(day, self.offset).midpoint());
      input.description = description.clone();
      inputs.push(input);
      if day == end {
        break;
      }
      day = day.succ_opt().ok_or_else(|| {
        Error::InvalidRange("date range exceeds the supported calendar".into())
      })?;
    }

    let events = self
      .store
      .insert_events(inputs)
      .await
      .map_err(Error::store)?;
    let days = events.len() as u64;
    info!(
      person = %person.name,
      status = status.as_str(),
      days,
      "ranged manual entry"
    );

    Ok(ManualReceipt {
      message: format!(
        "Recorded {} for {} over {} day(s).",
        status.label(),
        person.name,
        days
      ),
      person,
      status,
      days,
    })
  }

  // ── Day reset ─────────────────────────────────────────────────────────

  /// Purge every event of one calendar day. Irreversible; confirmation is
  /// a caller concern.
  pub async fn reset_day(&self, date: &str) -> Result<ResetReceipt> {
    let date = window::parse_date(date)?;
    let window = DayWindow::for_date(date, self.offset);
    let deleted = self
      .store
      .delete_events_in_window(window)
      .await
      .map_err(Error::store)?;
    info!(%date, deleted, "day reset");

    Ok(ResetReceipt {
      message: format!("Deleted {deleted} event(s) for {date}."),
      date,
      deleted,
    })
  }

  // ── Read path ─────────────────────────────────────────────────────────

  /// The status census for `date` (`YYYY-MM-DD`), defaulting to today.
  pub async fn roster(&self, date: Option<&str>) -> Result<DailyRoster> {
    let date = match date {
      Some(s) => window::parse_date(s)?,
      None => chrono::Utc::now().with_timezone(&self.offset).date_naive(),
    };
    let window = DayWindow::for_date(date, self.offset);

    let persons = self.store.list_persons().await.map_err(Error::store)?;
    let events = self
      .store
      .events_in_window(window)
      .await
      .map_err(Error::store)?;
    debug!(%date, persons = persons.len(), events = events.len(), "roster");

    Ok(resolve_day(date, &persons, &events))
  }

  // ── Directory ─────────────────────────────────────────────────────────

  pub async fn persons(&self) -> Result<Vec<Person>> {
    self.store.list_persons().await.map_err(Error::store)
  }

  /// Add a person to the directory, or refresh the name behind an existing
  /// code. The seed-import path.
  pub async fn enroll(&self, name: &str, code: &str) -> Result<Person> {
    let name = name.trim();
    let code = code.trim();
    if name.is_empty() || code.is_empty() {
      return Err(Error::InvalidInput(
        "person name and code must be non-empty".into(),
      ));
    }
    self
      .store
      .upsert_person(NewPerson { name: name.into(), code: code.into() })
      .await
      .map_err(Error::store)
  }
}
