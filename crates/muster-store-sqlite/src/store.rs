//! [`SqliteStore`] — the SQLite implementation of [`RosterStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use muster_core::{
  event::{AttendanceEvent, NewEvent, Status},
  person::{NewPerson, Person},
  store::{CheckinOutcome, CorrectionOutcome, RosterStore},
  window::DayWindow,
};

use crate::{
  Error, Result,
  encode::{RawEvent, RawPerson, encode_dt, encode_status, encode_uuid},
  schema::SCHEMA,
};

const EVENT_COLUMNS: &str =
  "event_id, person_id, status, timestamp, evidence_url, description";

const PERSON_COLUMNS: &str = "person_id, name, code, created_at";

// ─── Row mapping ─────────────────────────────────────────────────────────────

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:     row.get(0)?,
    person_id:    row.get(1)?,
    status:       row.get(2)?,
    timestamp:    row.get(3)?,
    evidence_url: row.get(4)?,
    description:  row.get(5)?,
  })
}

fn person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    person_id:  row.get(0)?,
    name:       row.get(1)?,
    code:       row.get(2)?,
    created_at: row.get(3)?,
  })
}

/// Materialise a [`NewEvent`] into a full event row; the store stamps the
/// insert time when the engine did not pin one.
fn build_event(input: NewEvent) -> AttendanceEvent {
  AttendanceEvent {
    event_id:     Uuid::new_v4(),
    person_id:    input.person_id,
    status:       input.status,
    timestamp:    input.timestamp.unwrap_or_else(Utc::now),
    evidence_url: input.evidence_url,
    description:  input.description,
  }
}

fn encode_event(event: &AttendanceEvent) -> RawEvent {
  RawEvent {
    event_id:     encode_uuid(event.event_id),
    person_id:    encode_uuid(event.person_id),
    status:       encode_status(event.status).to_owned(),
    timestamp:    encode_dt(event.timestamp),
    evidence_url: event.evidence_url.clone(),
    description:  event.description.clone(),
  }
}

fn insert_raw_event(
  conn: &rusqlite::Connection,
  raw: &RawEvent,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO events (event_id, person_id, status, timestamp, evidence_url, description)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      raw.event_id,
      raw.person_id,
      raw.status,
      raw.timestamp,
      raw.evidence_url,
      raw.description,
    ],
  )?;
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Muster attendance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// for one store serialise on the connection's worker thread, so the
/// transactional conditional writes below cannot interleave.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let person = Person {
      person_id:  Uuid::new_v4(),
      name:       input.name,
      code:       input.code,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(person.person_id);
    let name     = person.name.clone();
    let code     = person.code.clone();
    let at_str   = encode_dt(person.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (person_id, name, code, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, code, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn upsert_person(&self, input: NewPerson) -> Result<Person> {
    let id_str = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(Utc::now());
    let name   = input.name;
    let code   = input.code;

    let raw: RawPerson = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (person_id, name, code, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(code) DO UPDATE SET name = excluded.name",
          rusqlite::params![id_str, name, code, at_str],
        )?;
        let raw = conn.query_row(
          &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE code = ?1"),
          rusqlite::params![code],
          person_from_row,
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_person()
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1"),
              rusqlite::params![id_str],
              person_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn find_person_by_code(&self, code: &str) -> Result<Option<Person>> {
    let code = code.to_owned();

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE code = ?1"),
              rusqlite::params![code],
              person_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_persons(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY name"))?;
        let rows = stmt
          .query_map([], person_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn insert_event(&self, input: NewEvent) -> Result<AttendanceEvent> {
    let event = build_event(input);
    let raw = encode_event(&event);

    self
      .conn
      .call(move |conn| {
        insert_raw_event(conn, &raw)?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn insert_events(
    &self,
    inputs: Vec<NewEvent>,
  ) -> Result<Vec<AttendanceEvent>> {
    let events: Vec<AttendanceEvent> =
      inputs.into_iter().map(build_event).collect();
    let raws: Vec<RawEvent> = events.iter().map(encode_event).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for raw in &raws {
          insert_raw_event(&tx, raw)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(events)
  }

  async fn events_in_window(
    &self,
    window: DayWindow,
  ) -> Result<Vec<AttendanceEvent>> {
    let start = encode_dt(window.start);
    let end = encode_dt(window.end);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events
           WHERE timestamp >= ?1 AND timestamp < ?2
           ORDER BY timestamp DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![start, end], event_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn latest_event_in_window(
    &self,
    person_id: Uuid,
    window: DayWindow,
  ) -> Result<Option<AttendanceEvent>> {
    let person_str = encode_uuid(person_id);
    let start = encode_dt(window.start);
    let end = encode_dt(window.end);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE person_id = ?1 AND timestamp >= ?2 AND timestamp < ?3
                 ORDER BY timestamp DESC LIMIT 1"
              ),
              rusqlite::params![person_str, start, end],
              event_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn delete_events_in_window(&self, window: DayWindow) -> Result<u64> {
    let start = encode_dt(window.start);
    let end = encode_dt(window.end);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM events WHERE timestamp >= ?1 AND timestamp < ?2",
          rusqlite::params![start, end],
        )?;
        Ok(n as u64)
      })
      .await?;

    Ok(deleted)
  }

  // ── Atomic conditional writes ─────────────────────────────────────────────

  async fn record_checkin(
    &self,
    input: NewEvent,
    window: DayWindow,
  ) -> Result<CheckinOutcome> {
    let event = build_event(input);
    let raw = encode_event(&event);
    let person_str = raw.person_id.clone();
    let start = encode_dt(window.start);
    let end = encode_dt(window.end);
    let aboard = encode_status(Status::Aboard);

    // Duplicate check and insert share one transaction; two concurrent
    // scans cannot both pass the check.
    let (inserted, raw_out): (bool, RawEvent) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let latest: Option<RawEvent> = tx
          .query_row(
            &format!(
              "SELECT {EVENT_COLUMNS} FROM events
               WHERE person_id = ?1 AND timestamp >= ?2 AND timestamp < ?3
               ORDER BY timestamp DESC LIMIT 1"
            ),
            rusqlite::params![person_str, start, end],
            event_from_row,
          )
          .optional()?;

        if let Some(existing) = latest {
          if existing.status == aboard {
            tx.commit()?;
            return Ok((false, existing));
          }
        }

        insert_raw_event(&tx, &raw)?;
        tx.commit()?;
        Ok((true, raw))
      })
      .await?;

    if inserted {
      Ok(CheckinOutcome::Recorded(event))
    } else {
      Ok(CheckinOutcome::AlreadyAboard(raw_out.into_event()?))
    }
  }

  async fn correct_today(
    &self,
    person_id: Uuid,
    status: Status,
    description: Option<String>,
    window: DayWindow,
  ) -> Result<CorrectionOutcome> {
    // Prepared in case no same-day row exists and we insert instead.
    let fresh = build_event(NewEvent {
      person_id,
      status,
      timestamp: None,
      evidence_url: None,
      description: description.clone(),
    });
    let raw_fresh = encode_event(&fresh);
    let person_str = encode_uuid(person_id);
    let start = encode_dt(window.start);
    let end = encode_dt(window.end);
    let status_str = encode_status(status).to_owned();

    let (updated, raw_out): (bool, RawEvent) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let latest: Option<RawEvent> = tx
          .query_row(
            &format!(
              "SELECT {EVENT_COLUMNS} FROM events
               WHERE person_id = ?1 AND timestamp >= ?2 AND timestamp < ?3
               ORDER BY timestamp DESC LIMIT 1"
            ),
            rusqlite::params![person_str, start, end],
            event_from_row,
          )
          .optional()?;

        match latest {
          Some(mut existing) => {
            // Collapse: overwrite in place, keep timestamp and evidence.
            tx.execute(
              "UPDATE events SET status = ?1, description = ?2 WHERE event_id = ?3",
              rusqlite::params![status_str, description, existing.event_id],
            )?;
            tx.commit()?;
            existing.status = status_str;
            existing.description = description;
            Ok((true, existing))
          }
          None => {
            insert_raw_event(&tx, &raw_fresh)?;
            tx.commit()?;
            Ok((false, raw_fresh))
          }
        }
      })
      .await?;

    if updated {
      Ok(CorrectionOutcome::Updated(raw_out.into_event()?))
    } else {
      Ok(CorrectionOutcome::Created(raw_out.into_event()?))
    }
  }
}
