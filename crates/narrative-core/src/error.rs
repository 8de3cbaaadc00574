//! Error types for `narrative-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown entity type: {0:?}")]
  UnknownEntityType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
