//! Input validation for events and registration candidates.
//!
//! Validation runs before any storage access. Every rule is checked so the
//! caller gets the full list of problems in one response.

use serde::Serialize;

use crate::{
  Error, Result,
  event::{NewAttendee, NewEvent},
};

pub const MAX_EVENT_NAME_LEN: usize = 200;
pub const MAX_LOCATION_LEN: usize = 300;
pub const MAX_ATTENDEE_NAME_LEN: usize = 100;
pub const MAX_CAPACITY: i64 = 10_000;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

impl FieldError {
  fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self { field, message: message.into() }
  }

  /// `field: message; field: message` — used in the error's `Display`.
  pub fn summarize(errors: &[FieldError]) -> String {
    errors
      .iter()
      .map(|e| format!("{}: {}", e.field, e.message))
      .collect::<Vec<_>>()
      .join("; ")
  }
}

/// Check `input` and return it with text fields trimmed.
pub fn new_event(input: NewEvent) -> Result<NewEvent> {
  let mut errors = Vec::new();

  let name = input.name.trim().to_owned();
  if name.is_empty() {
    errors.push(FieldError::new("name", "Event name is required"));
  } else if name.chars().count() > MAX_EVENT_NAME_LEN {
    errors.push(FieldError::new(
      "name",
      format!("Event name must be at most {MAX_EVENT_NAME_LEN} characters"),
    ));
  }

  if input.start_time >= input.end_time {
    errors.push(FieldError::new("end_time", "End time must be after start time"));
  }

  let location = input.location.trim().to_owned();
  if location.is_empty() {
    errors.push(FieldError::new("location", "Event location is required"));
  } else if location.chars().count() > MAX_LOCATION_LEN {
    errors.push(FieldError::new(
      "location",
      format!("Location must be at most {MAX_LOCATION_LEN} characters"),
    ));
  }

  if !(1..=MAX_CAPACITY).contains(&input.max_capacity) {
    errors.push(FieldError::new(
      "max_capacity",
      format!("Maximum capacity must be between 1 and {MAX_CAPACITY}"),
    ));
  }

  if !errors.is_empty() {
    return Err(Error::Validation(errors));
  }

  Ok(NewEvent { name, location, ..input })
}

/// Check a registration candidate and return it with both fields trimmed.
pub fn new_attendee(input: NewAttendee) -> Result<NewAttendee> {
  let mut errors = Vec::new();

  let name = input.name.trim().to_owned();
  if name.is_empty() {
    errors.push(FieldError::new("name", "Attendee name is required"));
  } else if name.chars().count() > MAX_ATTENDEE_NAME_LEN {
    errors.push(FieldError::new(
      "name",
      format!("Name must be at most {MAX_ATTENDEE_NAME_LEN} characters"),
    ));
  }

  let email = input.email.trim().to_owned();
  if email.is_empty() {
    errors.push(FieldError::new("email", "Email address is required"));
  } else if !is_plausible_email(&email) {
    errors.push(FieldError::new("email", "Email address is not valid"));
  }

  if !errors.is_empty() {
    return Err(Error::Validation(errors));
  }

  Ok(NewAttendee { name, email })
}

/// Shape check only: `local@domain.tld`, no whitespace, exactly one `@`.
fn is_plausible_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  match domain.rfind('.') {
    Some(dot) => dot > 0 && dot < domain.len() - 1,
    None => false,
  }
}
