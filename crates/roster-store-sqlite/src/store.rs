//! [`SqliteStore`] — the SQLite implementation of [`EventStore`].

use std::{
  path::Path,
  time::{Duration, Instant},
};

use roster_core::{
  event::{Attendee, Event, EventId, EventView, NewAttendee, NewEvent},
  registration::{Rejection, RegistrationOutcome, admit},
  store::EventStore,
};
use rusqlite::{ErrorCode, TransactionBehavior};

use crate::{
  Error, Result,
  rows::{encode_dt, select_all_events, select_attendees, select_event},
  schema::{RESET, SCHEMA},
};

/// How long a connection waits on a held write lock before reporting busy.
/// A registration waits no longer than what is left of its deadline.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

// ─── Retry policy ────────────────────────────────────────────────────────────

/// How often a registration is retried when the write lock is contended.
/// The wait before retry `n` is `backoff * n`, cut short by the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub attempts: u32,
  pub backoff:  Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { attempts: 5, backoff: Duration::from_millis(25) }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An event store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Separate
/// stores opened on the same file coordinate through SQLite's write lock.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  retry: RetryPolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, retry: RetryPolicy::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, retry: RetryPolicy::default() };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn with_retry(self, retry: RetryPolicy) -> Self { Self { retry, ..self } }

  /// Close the underlying connection. Every clone of this store fails
  /// afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Replace every event and attendee with the rows created by `fixtures`,
  /// a batch of SQL statements. Id sequences restart from 1 first. Runs in a
  /// single transaction: on any error the previous contents survive.
  pub async fn reseed(&self, fixtures: impl Into<String>) -> Result<()> {
    let fixtures = fixtures.into();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(RESET)?;
        tx.execute_batch(&fixtures)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::info!("store reseeded from fixtures");
    Ok(())
  }
}

// ─── Registration transaction ────────────────────────────────────────────────

/// Read, decide and insert under one `BEGIN IMMEDIATE` transaction.
///
/// The immediate transaction holds the database write lock from the first
/// read, so no other registration can commit between the snapshot and the
/// insert. Every early return drops `tx`, which rolls it back; that includes
/// reaching `deadline` before the commit.
fn register_in_tx(
  conn: &mut rusqlite::Connection,
  event_id: EventId,
  candidate: NewAttendee,
  deadline: Instant,
) -> Result<RegistrationOutcome, tokio_rusqlite::Error> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let Some(raw) = select_event(&tx, event_id)? else {
    return Ok(RegistrationOutcome::EventNotFound);
  };
  let view = raw
    .into_view()
    .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

  if let Err(rejection) = admit(&view, &candidate) {
    return Ok(RegistrationOutcome::Rejected(rejection));
  }

  let inserted = tx.execute(
    "INSERT INTO attendees (event_id, name, email) VALUES (?1, ?2, ?3)",
    rusqlite::params![event_id, candidate.name, candidate.email],
  );
  match inserted {
    Ok(_) => {}
    // UNIQUE (event_id, email) backs up the duplicate check.
    Err(e) if is_unique_violation(&e) => {
      return Ok(RegistrationOutcome::Rejected(Rejection::AlreadyRegistered));
    }
    Err(e) => return Err(e.into()),
  }

  let attendee = Attendee {
    id: tx.last_insert_rowid(),
    event_id,
    name: candidate.name,
    email: candidate.email,
  };
  if Instant::now() >= deadline {
    return Ok(RegistrationOutcome::TimedOut);
  }
  tx.commit()?;

  Ok(RegistrationOutcome::Registered(attendee))
}

/// Runs [`register_in_tx`] with the lock wait clamped to what is left before
/// `deadline`, then restores the connection's usual busy timeout.
fn register_before(
  conn: &mut rusqlite::Connection,
  event_id: EventId,
  candidate: NewAttendee,
  deadline: Instant,
) -> Result<RegistrationOutcome, tokio_rusqlite::Error> {
  let remaining = deadline.saturating_duration_since(Instant::now());
  if remaining.is_zero() {
    return Ok(RegistrationOutcome::TimedOut);
  }

  conn.busy_timeout(remaining.min(BUSY_TIMEOUT))?;
  let outcome = register_in_tx(conn, event_id, candidate, deadline);
  conn.busy_timeout(BUSY_TIMEOUT)?;
  outcome
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn is_contention(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if matches!(f.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
  )
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  async fn insert_event(&self, input: NewEvent) -> Result<Event> {
    let start_str = encode_dt(input.start_time);
    let end_str   = encode_dt(input.end_time);
    let name      = input.name.clone();
    let location  = input.location.clone();
    let capacity  = input.max_capacity;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (name, start_time, end_time, location, max_capacity)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![name, start_str, end_str, location, capacity],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Event {
      id,
      name:         input.name,
      start_time:   input.start_time,
      end_time:     input.end_time,
      location:     input.location,
      max_capacity: input.max_capacity,
    })
  }

  async fn fetch_event(&self, id: EventId) -> Result<Option<EventView>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_event(conn, id)?))
      .await?;

    raw.map(|r| r.into_view()).transpose()
  }

  async fn list_events(&self) -> Result<Vec<EventView>> {
    let raws = self
      .conn
      .call(|conn| {
        // One read transaction so events and attendees come from one snapshot.
        let tx = conn.transaction()?;
        let raws = select_all_events(&tx)?;
        tx.commit()?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(|r| r.into_view()).collect()
  }

  async fn list_attendees(&self, event_id: EventId) -> Result<Vec<Attendee>> {
    let attendees = self
      .conn
      .call(move |conn| Ok(select_attendees(conn, event_id)?))
      .await?;
    Ok(attendees)
  }

  async fn register(
    &self,
    event_id: EventId,
    candidate: NewAttendee,
    deadline: Instant,
  ) -> Result<RegistrationOutcome> {
    let mut attempt = 1;
    loop {
      let candidate = candidate.clone();
      let result = self
        .conn
        .call(move |conn| register_before(conn, event_id, candidate, deadline))
        .await;

      match result {
        Err(e) if is_contention(&e) => {
          let remaining = deadline.saturating_duration_since(Instant::now());
          if remaining.is_zero() {
            tracing::warn!(event_id, attempt, "registration deadline passed while busy");
            return Ok(RegistrationOutcome::TimedOut);
          }
          if attempt >= self.retry.attempts {
            return Err(Error::Busy(attempt));
          }
          tracing::warn!(event_id, attempt, "database busy, retrying registration");
          tokio::time::sleep((self.retry.backoff * attempt).min(remaining)).await;
          attempt += 1;
        }
        other => return Ok(other?),
      }
    }
  }
}
