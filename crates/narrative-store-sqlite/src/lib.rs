//! SQLite backend for the narrative corpus.
//!
//! Builds the database from CSV exports in a single transaction, reads the
//! relationship table back for graph export, and runs the read-only
//! integrity battery against a finished database.

mod encode;
mod import;

pub mod build;
pub mod error;
pub mod integrity;
pub mod relationships;
pub mod schema;

pub use build::{ImportReport, TableOutcome, build_database};
pub use error::{Error, Result};
pub use import::import_csv;
pub use integrity::{CheckReport, IntegrityChecker};
pub use relationships::fetch_relationships;

#[cfg(test)]
mod tests;
