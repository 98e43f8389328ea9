//! [`Roster`] — the service handle shared by every request.
//!
//! Built once at startup around a store, then cloned into each handler. Every
//! operation validates its input, runs the store call under a timeout and
//! turns backend results into the tagged [`Error`].
//!
//! Registration is the one write whose late completion matters: dropping the
//! future does not stop a closure already queued on the database thread. The
//! store is therefore handed the deadline itself and refuses to commit past
//! it, while the outer timer waits a short grace period for that answer.

use std::{
  future::Future,
  sync::Arc,
  time::{Duration, Instant},
};

use crate::{
  Error, Result,
  event::{Attendee, EventId, EventView, NewAttendee, NewEvent},
  registration::{Rejection, RegistrationOutcome},
  store::EventStore,
  validate,
};

/// Default upper bound on a single store call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long past its deadline a registration may take to report back.
const REGISTER_GRACE: Duration = Duration::from_millis(500);

pub struct Roster<S> {
  store:   Arc<S>,
  timeout: Duration,
}

impl<S> Clone for Roster<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), timeout: self.timeout }
  }
}

impl<S: EventStore> Roster<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, timeout: DEFAULT_TIMEOUT } }

  pub fn with_timeout(self, timeout: Duration) -> Self { Self { timeout, ..self } }

  pub fn store(&self) -> &S { &self.store }

  /// Validate and persist a new event, then return its canonical read view
  /// (attendee list included, always empty at this point).
  pub async fn create_event(&self, input: NewEvent) -> Result<EventView> {
    let input = validate::new_event(input)?;
    let event = self.guarded("insert_event", self.store.insert_event(input)).await?;
    tracing::info!(event_id = event.id, name = %event.name, "event created");

    self
      .guarded("fetch_event", self.store.fetch_event(event.id))
      .await?
      .ok_or(Error::EventNotFound(event.id))
  }

  pub async fn list_events(&self) -> Result<Vec<EventView>> {
    self.guarded("list_events", self.store.list_events()).await
  }

  pub async fn get_event(&self, id: EventId) -> Result<EventView> {
    self
      .guarded("fetch_event", self.store.fetch_event(id))
      .await?
      .ok_or(Error::EventNotFound(id))
  }

  /// Register `candidate` for `event_id`, enforcing capacity and per-event
  /// email uniqueness atomically in the store.
  pub async fn register_attendee(
    &self,
    event_id: EventId,
    candidate: NewAttendee,
  ) -> Result<Attendee> {
    let candidate = validate::new_attendee(candidate)?;
    let email = candidate.email.clone();
    let deadline = Instant::now() + self.timeout;

    let call = self.store.register(event_id, candidate, deadline);
    match self.guarded_for("register", self.timeout + REGISTER_GRACE, call).await? {
      RegistrationOutcome::Registered(attendee) => {
        tracing::info!(event_id, attendee_id = attendee.id, "attendee registered");
        Ok(attendee)
      }
      RegistrationOutcome::EventNotFound => Err(Error::EventNotFound(event_id)),
      RegistrationOutcome::Rejected(Rejection::AtCapacity { max_capacity }) => {
        tracing::warn!(event_id, max_capacity, "registration rejected: event full");
        Err(Error::CapacityExceeded { event_id, max_capacity })
      }
      RegistrationOutcome::Rejected(Rejection::AlreadyRegistered) => {
        tracing::warn!(event_id, "registration rejected: duplicate email");
        Err(Error::DuplicateRegistration { event_id, email })
      }
      RegistrationOutcome::TimedOut => {
        tracing::error!(event_id, timeout = ?self.timeout, "registration timed out");
        Err(Error::Timeout(self.timeout))
      }
    }
  }

  /// Attendees of `event_id`. An unknown event yields an empty list.
  pub async fn list_attendees(&self, event_id: EventId) -> Result<Vec<Attendee>> {
    self.guarded("list_attendees", self.store.list_attendees(event_id)).await
  }

  async fn guarded<T>(
    &self,
    op: &'static str,
    call: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T> {
    self.guarded_for(op, self.timeout, call).await
  }

  /// Runs `call` under `limit`. The reported timeout is always the configured
  /// one, whatever grace `limit` adds to it.
  async fn guarded_for<T>(
    &self,
    op: &'static str,
    limit: Duration,
    call: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T> {
    tracing::debug!(op, "store call");
    match tokio::time::timeout(limit, call).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => {
        tracing::error!(op, error = %e, "store call failed");
        Err(Error::Storage(Box::new(e)))
      }
      Err(_) => {
        tracing::error!(op, timeout = ?self.timeout, "store call timed out");
        Err(Error::Timeout(self.timeout))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::event::Event;

  /// A store whose every call hangs, or answers `register` with a fixed
  /// outcome. Counts the calls it receives and keeps the last deadline.
  struct ScriptedStore {
    outcome:  Option<RegistrationOutcome>,
    calls:    AtomicUsize,
    deadline: Mutex<Option<Instant>>,
  }

  impl ScriptedStore {
    fn stalled() -> Self {
      Self { outcome: None, calls: AtomicUsize::new(0), deadline: Mutex::new(None) }
    }

    fn answering(outcome: RegistrationOutcome) -> Self {
      Self { outcome: Some(outcome), ..Self::stalled() }
    }

    async fn answer<T>(&self, value: impl FnOnce() -> Option<T>) -> std::io::Result<T> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      match value() {
        Some(v) => Ok(v),
        None => std::future::pending().await,
      }
    }
  }

  impl EventStore for ScriptedStore {
    type Error = std::io::Error;

    async fn insert_event(&self, _input: NewEvent) -> std::io::Result<Event> {
      self.answer(|| None).await
    }

    async fn fetch_event(&self, _id: EventId) -> std::io::Result<Option<EventView>> {
      self.answer(|| None).await
    }

    async fn list_events(&self) -> std::io::Result<Vec<EventView>> {
      self.answer(|| None).await
    }

    async fn list_attendees(&self, _event_id: EventId) -> std::io::Result<Vec<Attendee>> {
      self.answer(|| None).await
    }

    async fn register(
      &self,
      _event_id: EventId,
      _candidate: NewAttendee,
      deadline: Instant,
    ) -> std::io::Result<RegistrationOutcome> {
      *self.deadline.lock().unwrap() = Some(deadline);
      self.answer(|| self.outcome.clone()).await
    }
  }

  fn roster(store: ScriptedStore) -> Roster<ScriptedStore> {
    Roster::new(Arc::new(store)).with_timeout(Duration::from_millis(20))
  }

  fn alice() -> NewAttendee {
    NewAttendee { name: "Alice".into(), email: "a@x.com".into() }
  }

  #[tokio::test]
  async fn stalled_store_times_out() {
    let r = roster(ScriptedStore::stalled());
    let err = r.list_events().await.unwrap_err();
    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(20)));
  }

  #[tokio::test]
  async fn invalid_candidate_never_reaches_store() {
    let r = roster(ScriptedStore::stalled());
    let bad = NewAttendee { name: "Alice".into(), email: "nope".into() };
    let err = r.register_attendee(1, bad).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(r.store().calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn invalid_event_never_reaches_store() {
    let r = roster(ScriptedStore::stalled());
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let input = NewEvent {
      name:         "Conf".into(),
      start_time:   at,
      end_time:     at,
      location:     "Hall A".into(),
      max_capacity: 1,
    };
    assert!(matches!(r.create_event(input).await, Err(Error::Validation(_))));
    assert_eq!(r.store().calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn outcomes_map_to_tagged_errors() {
    let r = roster(ScriptedStore::answering(RegistrationOutcome::EventNotFound));
    assert!(matches!(
      r.register_attendee(9, alice()).await,
      Err(Error::EventNotFound(9))
    ));

    let r = roster(ScriptedStore::answering(RegistrationOutcome::Rejected(
      Rejection::AtCapacity { max_capacity: 3 },
    )));
    assert!(matches!(
      r.register_attendee(9, alice()).await,
      Err(Error::CapacityExceeded { event_id: 9, max_capacity: 3 })
    ));

    let r = roster(ScriptedStore::answering(RegistrationOutcome::Rejected(
      Rejection::AlreadyRegistered,
    )));
    match r.register_attendee(9, alice()).await {
      Err(Error::DuplicateRegistration { event_id, email }) => {
        assert_eq!(event_id, 9);
        assert_eq!(email, "a@x.com");
      }
      other => panic!("expected duplicate registration, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn store_side_timeout_is_reported_as_timeout() {
    let r = roster(ScriptedStore::answering(RegistrationOutcome::TimedOut));
    let before = Instant::now();
    let err = r.register_attendee(9, alice()).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(20)));

    let deadline = r.store().deadline.lock().unwrap().expect("deadline passed to store");
    assert!(deadline >= before + Duration::from_millis(20));
    assert!(deadline <= Instant::now() + Duration::from_millis(20));
  }

  #[tokio::test]
  async fn stalled_registration_still_times_out() {
    let r = roster(ScriptedStore::stalled());
    let err = r.register_attendee(9, alice()).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(20)));
    assert_eq!(r.store().calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn registered_attendee_is_returned() {
    let attendee = Attendee {
      id:       4,
      event_id: 9,
      name:     "Alice".into(),
      email:    "a@x.com".into(),
    };
    let r = roster(ScriptedStore::answering(RegistrationOutcome::Registered(
      attendee.clone(),
    )));
    assert_eq!(r.register_attendee(9, alice()).await.unwrap(), attendee);
  }
}
