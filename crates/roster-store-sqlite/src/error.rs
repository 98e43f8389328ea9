//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The write lock stayed contended for every attempt.
  #[error("database busy after {0} attempts")]
  Busy(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
