//! SQL schema for the Roster SQLite store.
//!
//! Executed at connection startup; versioned with `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS events (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT    NOT NULL,
    start_time    TEXT    NOT NULL,   -- RFC 3339, UTC
    end_time      TEXT    NOT NULL,   -- RFC 3339, UTC
    location      TEXT    NOT NULL,
    max_capacity  INTEGER NOT NULL CHECK (max_capacity > 0)
);

-- Attendees are only ever inserted by a registration transaction.
CREATE TABLE IF NOT EXISTS attendees (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id  INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    name      TEXT    NOT NULL,
    email     TEXT    NOT NULL,
    UNIQUE (event_id, email)
);

CREATE INDEX IF NOT EXISTS attendees_event_idx ON attendees(event_id);

PRAGMA user_version = 1;
";

/// Wipes all rows and restarts id sequences. Attendees go with their events.
pub const RESET: &str = "
DELETE FROM events;
DELETE FROM sqlite_sequence WHERE name IN ('events', 'attendees');
";
