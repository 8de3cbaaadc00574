//! Error type for `narrative-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The CSV file has no header row.
  #[error("no header found in {0}")]
  MissingHeader(PathBuf),

  /// A CSV column (after renaming) that the destination table lacks.
  #[error("table {table} has no column {column:?}")]
  UnknownColumn { table: String, column: String },

  #[error("database not found at {0}; run the import first")]
  DatabaseNotFound(PathBuf),
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
