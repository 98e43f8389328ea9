//! Handlers for the attendee endpoints nested under an event.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/events/{event_id}/register` | Body: `{"name":"...","email":"..."}`; 404 / 400 on rejection |
//! | `GET`  | `/events/{event_id}/attendees` | Empty list for an unknown event |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
};
use roster_core::{
  Roster,
  event::{Attendee, EventId, NewAttendee},
  store::EventStore,
};

use crate::error::ApiError;

/// `POST /events/{event_id}/register`
pub async fn register<S>(
  State(roster): State<Roster<S>>,
  event_id: Result<Path<EventId>, PathRejection>,
  body: Result<Json<NewAttendee>, JsonRejection>,
) -> Result<Json<Attendee>, ApiError>
where
  S: EventStore,
{
  let Path(event_id) = event_id?;
  let Json(body) = body?;
  Ok(Json(roster.register_attendee(event_id, body).await?))
}

/// `GET /events/{event_id}/attendees`
pub async fn list<S>(
  State(roster): State<Roster<S>>,
  event_id: Result<Path<EventId>, PathRejection>,
) -> Result<Json<Vec<Attendee>>, ApiError>
where
  S: EventStore,
{
  let Path(event_id) = event_id?;
  Ok(Json(roster.list_attendees(event_id).await?))
}
