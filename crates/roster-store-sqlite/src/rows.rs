//! Row mapping between SQLite and the domain types.
//!
//! Timestamps are stored as RFC 3339 strings in UTC. Everything else maps to
//! a native SQLite type. The `select_*` helpers take any connection so they
//! can run inside or outside a transaction.

use chrono::{DateTime, Utc};
use roster_core::event::{Attendee, Event, EventId, EventView};
use rusqlite::{Connection, OptionalExtension as _, Row};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// An `events` row with its timestamps still encoded.
pub struct RawEvent {
  pub id:           EventId,
  pub name:         String,
  pub start_time:   String,
  pub end_time:     String,
  pub location:     String,
  pub max_capacity: i64,
}

impl RawEvent {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      name:         row.get(1)?,
      start_time:   row.get(2)?,
      end_time:     row.get(3)?,
      location:     row.get(4)?,
      max_capacity: row.get(5)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      id:           self.id,
      name:         self.name,
      start_time:   decode_dt(&self.start_time)?,
      end_time:     decode_dt(&self.end_time)?,
      location:     self.location,
      max_capacity: self.max_capacity,
    })
  }
}

/// A raw event plus its attendees, read in one go.
pub struct RawEventView {
  pub event:     RawEvent,
  pub attendees: Vec<Attendee>,
}

impl RawEventView {
  pub fn into_view(self) -> Result<EventView> {
    Ok(EventView { event: self.event.into_event()?, attendees: self.attendees })
  }
}

fn attendee_from_row(row: &Row<'_>) -> rusqlite::Result<Attendee> {
  Ok(Attendee {
    id:       row.get(0)?,
    event_id: row.get(1)?,
    name:     row.get(2)?,
    email:    row.get(3)?,
  })
}

// ─── Queries ─────────────────────────────────────────────────────────────────

const EVENT_COLUMNS: &str = "id, name, start_time, end_time, location, max_capacity";
const ATTENDEE_COLUMNS: &str = "id, event_id, name, email";

pub fn select_event(conn: &Connection, id: EventId) -> rusqlite::Result<Option<RawEventView>> {
  let event = conn
    .query_row(
      &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
      rusqlite::params![id],
      RawEvent::from_row,
    )
    .optional()?;

  match event {
    Some(event) => {
      let attendees = select_attendees(conn, id)?;
      Ok(Some(RawEventView { event, attendees }))
    }
    None => Ok(None),
  }
}

pub fn select_attendees(conn: &Connection, event_id: EventId) -> rusqlite::Result<Vec<Attendee>> {
  let mut stmt = conn.prepare_cached(&format!(
    "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE event_id = ?1 ORDER BY id"
  ))?;
  let attendees = stmt
    .query_map(rusqlite::params![event_id], attendee_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(attendees)
}

/// Every event with its attendees, both in ascending id order. Two queries,
/// stitched together in memory.
pub fn select_all_events(conn: &Connection) -> rusqlite::Result<Vec<RawEventView>> {
  let mut stmt = conn.prepare(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id"))?;
  let mut views: Vec<RawEventView> = stmt
    .query_map([], RawEvent::from_row)?
    .map(|event| event.map(|event| RawEventView { event, attendees: Vec::new() }))
    .collect::<rusqlite::Result<_>>()?;

  let mut stmt = conn.prepare(&format!(
    "SELECT {ATTENDEE_COLUMNS} FROM attendees ORDER BY event_id, id"
  ))?;
  let attendees = stmt
    .query_map([], attendee_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  for attendee in attendees {
    // `views` is sorted by id, so a binary search finds the owner.
    if let Ok(i) = views.binary_search_by_key(&attendee.event_id, |v| v.event.id) {
      views[i].attendees.push(attendee);
    }
  }

  Ok(views)
}
