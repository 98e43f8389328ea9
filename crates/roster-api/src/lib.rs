//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by a [`Roster`] over any
//! [`roster_core::store::EventStore`]. TLS, CORS and request tracing are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = roster_api::api_router(Roster::new(store.clone()));
//! ```

pub mod attendees;
pub mod error;
pub mod events;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{Roster, store::EventStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `roster`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(roster: Roster<S>) -> Router<()>
where
  S: EventStore + 'static,
{
  Router::new()
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route("/events/{event_id}/register", post(attendees::register::<S>))
    .route("/events/{event_id}/attendees", get(attendees::list::<S>))
    .with_state(roster)
}

// ─── Integration tests ────────────────────────────────────────────────────────
