//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored count does not fit the domain type.
  #[error("invalid {column} value in database: {value}")]
  InvalidCount { column: &'static str, value: i64 },

  #[error("user not found: {0}")]
  UserNotFound(tally_core::user::UserId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
