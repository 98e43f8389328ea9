//! The `EventStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers depend on this abstraction through [`crate::Roster`], not on
//! any concrete backend.

use std::{future::Future, time::Instant};

use crate::{
  event::{Attendee, Event, EventId, EventView, NewAttendee, NewEvent},
  registration::RegistrationOutcome,
};

/// Abstraction over an event store backend.
///
/// Inputs reaching the store have already been validated. The store still
/// owns the invariants that need atomicity: [`register`](Self::register)
/// must read the event, apply
/// [`registration::admit`](crate::registration::admit) and insert inside
/// one transaction, leaving nothing behind on any path except acceptance.
/// It must also roll back rather than commit once its deadline has passed.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new event and return it with its generated id.
  fn insert_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Fetch one event with its attendees. Returns `None` if not found.
  fn fetch_event(
    &self,
    id: EventId,
  ) -> impl Future<Output = Result<Option<EventView>, Self::Error>> + Send + '_;

  /// All events in ascending id order, each with its attendees.
  fn list_events(
    &self,
  ) -> impl Future<Output = Result<Vec<EventView>, Self::Error>> + Send + '_;

  /// Attendees whose `event_id` matches, in ascending id order. Does not
  /// check that the event exists.
  fn list_attendees(
    &self,
    event_id: EventId,
  ) -> impl Future<Output = Result<Vec<Attendee>, Self::Error>> + Send + '_;

  /// Atomically decide and, if admitted, insert a registration.
  ///
  /// Nothing may be committed at or after `deadline`; the store reports
  /// [`RegistrationOutcome::TimedOut`] instead and leaves no row behind.
  fn register(
    &self,
    event_id: EventId,
    candidate: NewAttendee,
    deadline: Instant,
  ) -> impl Future<Output = Result<RegistrationOutcome, Self::Error>> + Send + '_;
}
