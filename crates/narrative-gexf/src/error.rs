//! Error types for the GEXF writer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("xml error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("cannot create {path}: {source}")]
  Create {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
