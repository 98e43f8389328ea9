//! Error types for `roster-core`.

use std::time::Duration;

use thiserror::Error;

use crate::{event::EventId, validate::FieldError};

/// The tagged result of every [`Roster`](crate::Roster) operation.
#[derive(Debug, Error)]
pub enum Error {
  #[error("event not found: {0}")]
  EventNotFound(EventId),

  #[error("event {event_id} is at full capacity ({max_capacity})")]
  CapacityExceeded { event_id: EventId, max_capacity: i64 },

  #[error("{email:?} is already registered for event {event_id}")]
  DuplicateRegistration { event_id: EventId, email: String },

  #[error("validation failed: {}", FieldError::summarize(.0))]
  Validation(Vec<FieldError>),

  #[error("store call timed out after {0:?}")]
  Timeout(Duration),

  /// Connection or transaction failure in the backend. Safe to retry.
  #[error("store error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
