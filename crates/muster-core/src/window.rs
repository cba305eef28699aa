//! Calendar-day windows in the organisation's reference timezone.
//!
//! Day boundaries are computed once in the fixed reference timezone and
//! converted to UTC instants; all comparisons use closed-open `[start, end)`
//! semantics. The host machine's local timezone never participates, so the
//! roster does not drift when the server clock and the crew's zone differ.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The reference offset of the original deployment (UTC-4).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -4;

/// Build a [`FixedOffset`] from a whole-hour offset east of UTC.
/// Hours outside ±23 are rejected as `InvalidInput`.
pub fn reference_offset(hours: i32) -> Result<FixedOffset> {
  hours
    .checked_mul(3600)
    .and_then(FixedOffset::east_opt)
    .ok_or_else(|| Error::InvalidInput(format!("invalid UTC offset: {hours}")))
}

/// One calendar day as a closed-open `[start, end)` pair of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl DayWindow {
  /// The window covering `date` in the reference timezone.
  pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
    // Local midnight minus the offset is the UTC instant of day start.
    let start_naive = date.and_time(NaiveTime::MIN) - offset;
    let start = Utc.from_utc_datetime(&start_naive);
    Self { start, end: start + Duration::days(1) }
  }

  /// The window covering the current calendar day in the reference timezone.
  pub fn today(offset: FixedOffset) -> Self {
    Self::for_date(Utc::now().with_timezone(&offset).date_naive(), offset)
  }

  /// `true` if `instant` falls inside the window (`start` inclusive, `end`
  /// exclusive).
  pub fn contains(&self, instant: DateTime<Utc>) -> bool {
    self.start <= instant && instant < self.end
  }

  /// The neutral mid-day instant used to pin ranged events, far from both
  /// day boundaries in any plausible offset.
  pub fn midpoint(&self) -> DateTime<Utc> {
    self.start + Duration::hours(12)
  }
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
    .map_err(|_| Error::InvalidInput(format!("malformed date: {s:?}")))
}

#[cfg(test)]
mod tests {
  use chrono::Timelike;

  use super::*;

  fn offset() -> FixedOffset {
    reference_offset(DEFAULT_UTC_OFFSET_HOURS).unwrap()
  }

  fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[test]
  fn window_start_is_local_midnight_in_utc() {
    let w = DayWindow::for_date(date("2024-06-10"), offset());
    // Local midnight at UTC-4 is 04:00 UTC.
    assert_eq!(w.start.to_rfc3339(), "2024-06-10T04:00:00+00:00");
    assert_eq!(w.end.to_rfc3339(), "2024-06-11T04:00:00+00:00");
  }

  #[test]
  fn window_is_closed_open() {
    let w = DayWindow::for_date(date("2024-06-10"), offset());
    assert!(w.contains(w.start));
    assert!(!w.contains(w.end));
    assert!(w.contains(w.end - Duration::seconds(1)));
    assert!(!w.contains(w.start - Duration::seconds(1)));
  }

  #[test]
  fn late_evening_of_previous_day_is_outside() {
    // 23:59 local on D-1 must not fall in D's window.
    let w = DayWindow::for_date(date("2024-06-10"), offset());
    let late_prev = Utc.from_utc_datetime(
      &(date("2024-06-09").and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap())
        - offset()),
    );
    assert!(!w.contains(late_prev));
  }

  #[test]
  fn midpoint_is_local_noon() {
    let w = DayWindow::for_date(date("2024-06-10"), offset());
    let local = w.midpoint().with_timezone(&offset());
    assert_eq!(local.hour(), 12);
    assert_eq!(local.date_naive(), date("2024-06-10"));
  }

  #[test]
  fn parse_date_accepts_iso_and_trims() {
    assert_eq!(parse_date(" 2024-01-03 ").unwrap(), date("2024-01-03"));
  }

  #[test]
  fn parse_date_rejects_malformed() {
    for bad in ["", "2024/01/03", "03-01-2024", "2024-13-01", "today"] {
      assert!(matches!(parse_date(bad), Err(Error::InvalidInput(_))), "{bad}");
    }
  }

  #[test]
  fn reference_offset_bounds() {
    assert!(reference_offset(0).is_ok());
    assert!(reference_offset(-12).is_ok());
    assert!(reference_offset(24).is_err());
    // Must reject, not overflow, on garbage config values.
    assert!(reference_offset(i32::MAX).is_err());
    assert!(reference_offset(i32::MIN).is_err());
  }
}
