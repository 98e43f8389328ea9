//! Events and attendees.
//!
//! An event owns its attendees: the storage layer deletes them together. In
//! the operations exposed here events are never updated and attendees are
//! only ever created by registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type EventId = i64;
pub type AttendeeId = i64;

// ─── Event ───────────────────────────────────────────────────────────────────

/// A persisted event row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub id:           EventId,
  pub name:         String,
  pub start_time:   DateTime<Utc>,
  pub end_time:     DateTime<Utc>,
  pub location:     String,
  pub max_capacity: i64,
}

/// Input to [`crate::store::EventStore::insert_event`].
/// The id is always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
  pub name:         String,
  /// Any RFC 3339 offset is accepted; it is normalised to UTC.
  pub start_time:   DateTime<Utc>,
  pub end_time:     DateTime<Utc>,
  pub location:     String,
  pub max_capacity: i64,
}

// ─── Attendee ────────────────────────────────────────────────────────────────

/// A person registered to exactly one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
  pub id:       AttendeeId,
  pub event_id: EventId,
  pub name:     String,
  /// Identifies the attendee within its event.
  pub email:    String,
}

/// A registration candidate, as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttendee {
  pub name:  String,
  pub email: String,
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// An event together with its attendees, ordered by ascending attendee id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
  #[serde(flatten)]
  pub event:     Event,
  pub attendees: Vec<Attendee>,
}

impl EventView {
  /// Seats still available. Never negative.
  pub fn remaining_capacity(&self) -> i64 {
    (self.event.max_capacity - self.attendees.len() as i64).max(0)
  }

  pub fn is_full(&self) -> bool { self.remaining_capacity() == 0 }

  pub fn has_email(&self, email: &str) -> bool {
    self.attendees.iter().any(|a| a.email == email)
  }
}
