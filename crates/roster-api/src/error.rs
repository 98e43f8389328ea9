//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::validate::FieldError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. The body is always
/// `{"detail": "<reason>"}`; internal details never reach the client.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid input")]
  Invalid(Vec<FieldError>),

  /// The request body or path could not be decoded at all.
  #[error("malformed request: {0}")]
  Malformed(String),

  #[error("unavailable: {0}")]
  Unavailable(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    use roster_core::Error as E;
    match e {
      E::EventNotFound(_) => ApiError::NotFound("Event not found".into()),
      E::CapacityExceeded { .. } => ApiError::BadRequest("Event is at full capacity".into()),
      E::DuplicateRegistration { .. } => {
        ApiError::BadRequest("Attendee already registered".into())
      }
      E::Validation(errors) => ApiError::Invalid(errors),
      E::Timeout(_) => ApiError::Unavailable("Storage timed out, try again".into()),
      E::Storage(source) => ApiError::Internal(source),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::Malformed(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::Malformed(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "detail": m }))),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, Json(json!({ "detail": m }))),
      ApiError::Invalid(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": "Invalid input", "errors": errors })),
      ),
      ApiError::Malformed(m) => {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": m })))
      }
      ApiError::Unavailable(m) => {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "detail": m })))
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "detail": "Internal server error" })),
        )
      }
    }
    .into_response()
  }
}
