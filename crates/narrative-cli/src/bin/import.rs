//! `narrative-import` — rebuild the SQLite database from the CSV exports.
//!
//! The database file is deleted and recreated on every run. Paths come from
//! `narrative.toml` / `NARRATIVE_*` unless overridden with `--db`.

use std::path::PathBuf;

use clap::Parser;
use narrative_cli::{Settings, init_tracing, log_import_report, run_import};

#[derive(Parser)]
#[command(author, version, about = "Import the narrative corpus CSV data into SQLite")]
struct Cli {
  /// Path to the output SQLite database.
  #[arg(long, value_name = "PATH")]
  db: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
  init_tracing();
  let cli = Cli::parse();

  let mut settings = Settings::load()?;
  if let Some(db) = cli.db {
    settings.db_path = db;
  }

  let report = run_import(&settings)?;
  log_import_report(&report);
  Ok(())
}
