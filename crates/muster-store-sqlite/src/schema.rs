//! SQL schema for the Muster SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Timestamps are RFC 3339 UTC strings with fixed-width microseconds, so
/// lexicographic `BETWEEN`-style comparisons order the same as the instants
/// they encode.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id  TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    code       TEXT NOT NULL UNIQUE,  -- scannable badge code
    created_at TEXT NOT NULL
);

-- Events are append-only except the same-day correction path, which
-- overwrites status/description of one row in place.
CREATE TABLE IF NOT EXISTS events (
    event_id     TEXT PRIMARY KEY,
    person_id    TEXT NOT NULL REFERENCES persons(person_id),
    status       TEXT NOT NULL,  -- Status discriminant, lowercase
    timestamp    TEXT NOT NULL,  -- ISO 8601 UTC, microsecond precision
    evidence_url TEXT,
    description  TEXT
);

CREATE INDEX IF NOT EXISTS events_person_idx    ON events(person_id);
CREATE INDEX IF NOT EXISTS events_timestamp_idx ON events(timestamp);
CREATE INDEX IF NOT EXISTS events_person_ts_idx ON events(person_id, timestamp);

PRAGMA user_version = 1;
";
