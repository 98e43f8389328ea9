//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Every event with its attendees |
//! | `POST` | `/events` | Body: [`NewEvent`]; returns 200 + the event with `attendees: []` |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use roster_core::{
  Roster,
  event::{EventView, NewEvent},
  store::EventStore,
};

use crate::error::ApiError;

/// `GET /events`
pub async fn list<S>(State(roster): State<Roster<S>>) -> Result<Json<Vec<EventView>>, ApiError>
where
  S: EventStore,
{
  Ok(Json(roster.list_events().await?))
}

/// `POST /events`
pub async fn create<S>(
  State(roster): State<Roster<S>>,
  body: Result<Json<NewEvent>, JsonRejection>,
) -> Result<Json<EventView>, ApiError>
where
  S: EventStore,
{
  let Json(body) = body?;
  Ok(Json(roster.create_event(body).await?))
}
