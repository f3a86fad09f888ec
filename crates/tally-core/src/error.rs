//! Error types for `tally-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("subject name must not be empty")]
  EmptyName,

  #[error("subject type must not be empty")]
  EmptyType,

  #[error("a {0}% target can never be reached by attending more classes")]
  UnreachableTarget(u8),

  #[error("unsupported target {0}%")]
  UnsupportedTarget(u8),

  #[error("unknown count field: {0:?}")]
  UnknownField(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
