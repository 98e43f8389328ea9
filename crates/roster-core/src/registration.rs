//! The registration decision.
//!
//! [`admit`] is pure: it judges a candidate against one snapshot of an event
//! and its attendees. Backends must call it on a snapshot read inside the
//! same transaction that performs the insert, so that concurrent
//! registrations for one event cannot both pass it.

use crate::event::{Attendee, EventView, NewAttendee};

/// Why a registration was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
  AtCapacity { max_capacity: i64 },
  AlreadyRegistered,
}

/// What a backend reports back from
/// [`EventStore::register`](crate::store::EventStore::register).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
  Registered(Attendee),
  EventNotFound,
  Rejected(Rejection),
  /// The deadline passed before the insert could commit; nothing was written.
  TimedOut,
}

/// Decide whether `candidate` may join `event`.
///
/// Capacity is checked before duplicates: a full event rejects everyone,
/// including people already on its list.
pub fn admit(event: &EventView, candidate: &NewAttendee) -> Result<(), Rejection> {
  if event.attendees.len() as i64 >= event.event.max_capacity {
    return Err(Rejection::AtCapacity { max_capacity: event.event.max_capacity });
  }
  if event.has_email(&candidate.email) {
    return Err(Rejection::AlreadyRegistered);
  }
  Ok(())
}
