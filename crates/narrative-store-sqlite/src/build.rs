//! Full database rebuild from a directory of CSV exports.

use std::path::{Path, PathBuf};

use narrative_core::catalog::IMPORT_ORDER;
use rusqlite::Connection;

use crate::{
  Error, Result,
  import::import_csv,
  schema::{configure_connection, create_schema},
};

/// What happened to one catalog table during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
  Imported(usize),
  /// The CSV file was absent; the table exists but is empty.
  Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
  pub table:    &'static str,
  pub csv_file: &'static str,
  pub outcome:  TableOutcome,
}

/// Per-table outcomes, in import order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
  pub db_path: PathBuf,
  pub tables:  Vec<TableReport>,
}

impl ImportReport {
  pub fn total_rows(&self) -> usize {
    self
      .tables
      .iter()
      .map(|t| match t.outcome {
        TableOutcome::Imported(n) => n,
        TableOutcome::Skipped => 0,
      })
      .sum()
  }

  pub fn rows(&self, table: &str) -> Option<usize> {
    self.tables.iter().find(|t| t.table == table).and_then(|t| {
      match t.outcome {
        TableOutcome::Imported(n) => Some(n),
        TableOutcome::Skipped => None,
      }
    })
  }
}

/// Rebuild the database at `db_path` from the CSV files in `data_dir`.
///
/// Any existing file at `db_path` is deleted first. The schema is created,
/// then every catalog table is loaded inside one transaction that commits
/// only after the last table; an error anywhere leaves no imported rows.
/// Per-table outcomes are returned rather than logged.
pub fn build_database(db_path: &Path, data_dir: &Path, ddl: &str) -> Result<ImportReport> {
  if let Some(parent) = db_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
  }

  if db_path.exists() {
    std::fs::remove_file(db_path).map_err(|e| Error::io(db_path, e))?;
    tracing::info!(path = %db_path.display(), "removed existing database");
  }

  let mut conn = Connection::open(db_path)?;
  configure_connection(&conn)?;
  create_schema(&conn, ddl)?;
  tracing::info!("schema created");

  let tx = conn.transaction()?;
  let mut tables = Vec::with_capacity(IMPORT_ORDER.len());

  for spec in IMPORT_ORDER {
    let csv_path = data_dir.join(spec.csv_file);
    let outcome = if csv_path.exists() {
      let count = import_csv(&tx, spec.name, &csv_path)?;
      tracing::debug!(table = spec.name, rows = count, "imported");
      TableOutcome::Imported(count)
    } else {
      TableOutcome::Skipped
    };
    tables.push(TableReport {
      table:    spec.name,
      csv_file: spec.csv_file,
      outcome,
    });
  }

  tx.commit()?;

  Ok(ImportReport {
    db_path: db_path.to_path_buf(),
    tables,
  })
}
