//! Daily aggregation — the status census for one calendar day.
//!
//! The roster is never stored; it is derived on read from the person
//! directory and the day's events.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  event::{AttendanceEvent, Status},
  person::Person,
};

// ─── Counts ──────────────────────────────────────────────────────────────────

/// One integer bucket per [`Status`] variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
  pub aboard:     u64,
  pub ashore:     u64,
  pub leave:      u64,
  pub authorized: u64,
  pub commission: u64,
  pub medical:    u64,
}

impl StatusCounts {
  fn bump(&mut self, status: Status) {
    match status {
      Status::Aboard => self.aboard += 1,
      Status::Ashore => self.ashore += 1,
      Status::Leave => self.leave += 1,
      Status::Authorized => self.authorized += 1,
      Status::Commission => self.commission += 1,
      Status::Medical => self.medical += 1,
    }
  }

  pub fn get(&self, status: Status) -> u64 {
    match status {
      Status::Aboard => self.aboard,
      Status::Ashore => self.ashore,
      Status::Leave => self.leave,
      Status::Authorized => self.authorized,
      Status::Commission => self.commission,
      Status::Medical => self.medical,
    }
  }

  /// Sum of all buckets. `total() + unmarked` must equal the directory size.
  pub fn total(&self) -> u64 {
    Status::ALL.iter().map(|s| self.get(*s)).sum()
  }
}

// ─── Resolved view ───────────────────────────────────────────────────────────

/// One person's effective status for the day. `status` is `None` for a
/// person with no event in the window ("unmarked").
#[derive(Debug, Clone, Serialize)]
pub struct PersonStatus {
  pub person: Person,
  pub status: Option<Status>,
  /// Display colour token for the status, when one exists.
  pub badge:  Option<&'static str>,
  /// The winning event, when one exists.
  pub event:  Option<AttendanceEvent>,
}

/// The computed census for one calendar day — never stored, always derived.
#[derive(Debug, Clone, Serialize)]
pub struct DailyRoster {
  pub date:     NaiveDate,
  pub counts:   StatusCounts,
  pub unmarked: u64,
  pub resolved: Vec<PersonStatus>,
  /// Every event of the day in store order (descending by timestamp),
  /// superseded scans included — the chronological history view.
  pub events:   Vec<AttendanceEvent>,
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Resolve the effective status of every directory person for `date`.
///
/// `events` must all fall inside the day's window. For each person the event
/// with the maximum timestamp wins; on equal timestamps the earlier element
/// wins, so a store feeding events pre-sorted descending keeps its own
/// ordering as the tie-break. Events for persons absent from the directory
/// do not resolve to a status, but still appear in the `events` history.
pub fn resolve_day(
  date: NaiveDate,
  persons: &[Person],
  events: &[AttendanceEvent],
) -> DailyRoster {
  let mut winners: HashMap<Uuid, &AttendanceEvent> = HashMap::new();
  for event in events {
    winners
      .entry(event.person_id)
      .and_modify(|best| {
        if event.timestamp > best.timestamp {
          *best = event;
        }
      })
      .or_insert(event);
  }

  let mut counts = StatusCounts::default();
  let mut unmarked = 0;
  let mut resolved = Vec::with_capacity(persons.len());

  for person in persons {
    let winner = winners.get(&person.person_id).copied();
    match winner {
      Some(event) => counts.bump(event.status),
      None => unmarked += 1,
    }
    resolved.push(PersonStatus {
      person: person.clone(),
      status: winner.map(|e| e.status),
      badge:  winner.map(|e| e.status.badge()),
      event:  winner.cloned(),
    });
  }

  DailyRoster { date, counts, unmarked, resolved, events: events.to_vec() }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};
  use uuid::Uuid;

  use super::*;

  fn person(name: &str) -> Person {
    Person {
      person_id:  Uuid::new_v4(),
      name:       name.into(),
      code:       name.to_lowercase(),
      created_at: Utc::now(),
    }
  }

  fn event(person: &Person, status: Status, minute: u32) -> AttendanceEvent {
    AttendanceEvent {
      event_id:     Uuid::new_v4(),
      person_id:    person.person_id,
      status,
      timestamp:    Utc.with_ymd_and_hms(2024, 6, 10, 12, minute, 0).unwrap(),
      evidence_url: None,
      description:  None,
    }
  }

  fn day() -> NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
  }

  #[test]
  fn latest_event_wins_regardless_of_input_order() {
    let p = person("Alice");
    let early = event(&p, Status::Aboard, 5);
    let late = event(&p, Status::Ashore, 45);

    for events in [vec![late.clone(), early.clone()], vec![early, late.clone()]] {
      let roster = resolve_day(day(), std::slice::from_ref(&p), &events);
      assert_eq!(roster.resolved[0].status, Some(Status::Ashore));
      assert_eq!(
        roster.resolved[0].event.as_ref().unwrap().event_id,
        late.event_id
      );
    }
  }

  #[test]
  fn equal_timestamps_keep_first_seen() {
    let p = person("Alice");
    let a = event(&p, Status::Aboard, 30);
    let mut b = event(&p, Status::Leave, 30);
    b.timestamp = a.timestamp;

    let roster = resolve_day(day(), std::slice::from_ref(&p), &[a, b]);
    assert_eq!(roster.resolved[0].status, Some(Status::Aboard));
  }

  #[test]
  fn buckets_plus_unmarked_equals_directory_size() {
    let people: Vec<Person> =
      ["a", "b", "c", "d", "e"].iter().map(|n| person(n)).collect();
    let events = vec![
      event(&people[0], Status::Aboard, 1),
      event(&people[1], Status::Leave, 2),
      event(&people[2], Status::Commission, 3),
      // people[3] and people[4] stay unmarked
    ];

    let roster = resolve_day(day(), &people, &events);
    assert_eq!(roster.counts.aboard, 1);
    assert_eq!(roster.counts.leave, 1);
    assert_eq!(roster.counts.commission, 1);
    assert_eq!(roster.unmarked, 2);
    assert_eq!(
      roster.counts.total() + roster.unmarked,
      people.len() as u64
    );
    assert_eq!(roster.resolved.len(), people.len());
  }

  #[test]
  fn events_for_unknown_persons_are_ignored() {
    let p = person("Alice");
    let stranger = person("nobody");
    let events = vec![event(&stranger, Status::Aboard, 10)];

    let roster = resolve_day(day(), std::slice::from_ref(&p), &events);
    assert_eq!(roster.counts.total(), 0);
    assert_eq!(roster.unmarked, 1);
    // Still visible in the history list.
    assert_eq!(roster.events.len(), 1);
  }

  #[test]
  fn history_keeps_superseded_events_in_input_order() {
    let p = person("Alice");
    let late = event(&p, Status::Ashore, 45);
    let early = event(&p, Status::Aboard, 5);
    let events = vec![late.clone(), early.clone()];

    let roster = resolve_day(day(), std::slice::from_ref(&p), &events);
    assert_eq!(roster.resolved[0].status, Some(Status::Ashore));
    // The superseded scan survives in the history, order untouched.
    let ids: Vec<_> = roster.events.iter().map(|e| e.event_id).collect();
    assert_eq!(ids, [late.event_id, early.event_id]);
  }

  #[test]
  fn badge_tracks_resolved_status() {
    let p = person("Alice");
    let unmarked = person("Bob");
    let events = vec![event(&p, Status::Medical, 10)];

    let roster = resolve_day(day(), &[p, unmarked], &events);
    assert_eq!(roster.resolved[0].badge, Some(Status::Medical.badge()));
    assert_eq!(roster.resolved[1].badge, None);
  }

  #[test]
  fn empty_directory_resolves_empty() {
    let p = person("Alice");
    let events = vec![event(&p, Status::Aboard, 10)];
    let roster = resolve_day(day(), &[], &events);
    assert_eq!(roster.unmarked, 0);
    assert_eq!(roster.counts.total(), 0);
    assert!(roster.resolved.is_empty());
  }

  #[test]
  fn multiple_corrections_only_last_counts() {
    let p = person("Alice");
    let mut events = Vec::new();
    for (i, status) in
      [Status::Aboard, Status::Leave, Status::Medical].iter().enumerate()
    {
      let mut e = event(&p, *status, 0);
      e.timestamp = e.timestamp + Duration::minutes(i as i64);
      events.push(e);
    }

    let roster = resolve_day(day(), std::slice::from_ref(&p), &events);
    assert_eq!(roster.counts.medical, 1);
    assert_eq!(roster.counts.total(), 1);
  }
}
