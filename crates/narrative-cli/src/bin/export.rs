//! `narrative-export` — write the relationship graph as GEXF for Gephi.

use std::path::PathBuf;

use clap::Parser;
use narrative_cli::{ExportOutcome, Settings, export_if_built, init_tracing};

#[derive(Parser)]
#[command(author, version, about = "Export narrative relationships to GEXF for Gephi")]
struct Cli {
  /// Path to the SQLite database.
  #[arg(long, value_name = "PATH")]
  db: Option<PathBuf>,

  /// Output GEXF file path.
  #[arg(long, value_name = "PATH")]
  output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
  init_tracing();
  let cli = Cli::parse();

  let settings = Settings::load()?;
  let db = cli.db.unwrap_or(settings.db_path);
  let output = cli.output.unwrap_or(settings.graph_path);

  match export_if_built(&db, &output)? {
    ExportOutcome::Exported(summary) => tracing::info!(
      "Exported {} nodes and {} edges to {}",
      summary.nodes,
      summary.edges,
      summary.path.display()
    ),
    ExportOutcome::MissingDatabase(db) => {
      tracing::error!("Database not found: {}", db.display());
      tracing::error!("Run `narrative-import` first to build the database.");
    }
  }
  Ok(())
}
