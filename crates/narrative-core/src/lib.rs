//! Core types for the narrative corpus database.
//!
//! This crate is free of database and XML dependencies. It holds the
//! entity vocabulary, the static import catalog and the cell coercion
//! pipeline shared by the importer and the graph exporter.

pub mod catalog;
pub mod coerce;
pub mod entity;
pub mod error;

pub use error::{Error, Result};
