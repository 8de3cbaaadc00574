//! Shared plumbing for the `narrative-*` binaries: layered settings,
//! logging setup, and the import/export/check drivers.

use std::{
  borrow::Cow,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use narrative_gexf::{GexfMeta, Graph};
use narrative_store_sqlite::{
  CheckReport, ImportReport, IntegrityChecker, TableOutcome, build_database,
  fetch_relationships, relationships::open_read_only, schema::SCHEMA,
};
use serde::Deserialize;
use tracing::{Level, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "narrative.toml";

/// Prefix for environment overrides, e.g. `NARRATIVE_DATA_DIR`.
pub const ENV_PREFIX: &str = "NARRATIVE";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Paths used by the tools. Defaults, then `narrative.toml`, then
/// `NARRATIVE_*` environment variables; CLI flags are applied on top by
/// each binary.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub data_dir:    PathBuf,
  pub db_path:     PathBuf,
  pub graph_path:  PathBuf,
  /// DDL file replacing the built-in schema.
  pub schema_path: Option<PathBuf>,
}

impl Settings {
  pub fn load() -> anyhow::Result<Self> { Self::load_from(Path::new(CONFIG_FILE)) }

  pub fn load_from(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("data_dir", "data")?
      .set_default("db_path", "database/killing_eve.db")?
      .set_default("graph_path", "database/killing_eve_graph.gexf")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()
      .with_context(|| format!("failed to read settings from {}", file.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  /// The DDL to build with: the configured file, or the built-in schema.
  pub fn schema_ddl(&self) -> anyhow::Result<Cow<'static, str>> {
    match &self.schema_path {
      Some(path) => std::fs::read_to_string(path)
        .map(Cow::Owned)
        .with_context(|| format!("failed to read schema {}", path.display())),
      None => Ok(Cow::Borrowed(SCHEMA)),
    }
  }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Install the global subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_target(false)
    .init();
}

/// `1234567` → `1,234,567`.
pub fn format_count(n: usize) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(ch);
  }
  out
}

// ─── Drivers ──────────────────────────────────────────────────────────────────

/// Rebuild the database described by `settings`.
pub fn run_import(settings: &Settings) -> anyhow::Result<ImportReport> {
  let ddl = settings.schema_ddl()?;
  build_database(&settings.db_path, &settings.data_dir, &ddl).with_context(|| {
    format!(
      "failed to build {} from {}",
      settings.db_path.display(),
      settings.data_dir.display()
    )
  })
}

/// The lines `narrative-import` prints for `report`: one per table, then
/// the total. Skipped tables are warnings.
pub fn import_report_lines(report: &ImportReport) -> Vec<(Level, String)> {
  let mut lines: Vec<(Level, String)> = report
    .tables
    .iter()
    .map(|t| match t.outcome {
      TableOutcome::Imported(n) => (
        Level::INFO,
        format!("  {:<28} <- {:<35} ({} rows)", t.table, t.csv_file, format_count(n)),
      ),
      TableOutcome::Skipped => (Level::WARN, format!("SKIP  {} (file not found)", t.csv_file)),
    })
    .collect();

  let name = report
    .db_path
    .file_name()
    .map_or_else(|| report.db_path.display().to_string(), |n| n.to_string_lossy().into_owned());
  lines.push((
    Level::INFO,
    format!("Done. {} total rows imported into {name}", format_count(report.total_rows())),
  ));
  lines
}

pub fn log_import_report(report: &ImportReport) {
  for (level, line) in import_report_lines(report) {
    if level == Level::WARN {
      tracing::warn!("{line}");
    } else {
      tracing::info!("{line}");
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
  pub nodes: usize,
  pub edges: usize,
  pub path:  PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
  Exported(ExportSummary),
  /// Nothing was written; the database has not been built yet.
  MissingDatabase(PathBuf),
}

/// Export unless the database is absent, which is not an error: the caller
/// prints guidance to run the import first.
pub fn export_if_built(db_path: &Path, output: &Path) -> anyhow::Result<ExportOutcome> {
  if !db_path.exists() {
    return Ok(ExportOutcome::MissingDatabase(db_path.to_path_buf()));
  }
  export_graph(db_path, output).map(ExportOutcome::Exported)
}

/// Read the relationship table from `db_path` and write it as GEXF.
pub fn export_graph(db_path: &Path, output: &Path) -> anyhow::Result<ExportSummary> {
  let rows = {
    let conn = open_read_only(db_path)
      .with_context(|| format!("failed to open {}", db_path.display()))?;
    fetch_relationships(&conn).context("failed to read relationships")?
  };

  let graph = Graph::from_relationships(&rows);
  narrative_gexf::write_file(&graph, &GexfMeta::default(), output)
    .with_context(|| format!("failed to write {}", output.display()))?;

  Ok(ExportSummary {
    nodes: graph.nodes.len(),
    edges: graph.edges.len(),
    path:  output.to_path_buf(),
  })
}

/// Run the integrity battery against `db_path`.
pub fn run_checks(db_path: &Path) -> anyhow::Result<CheckReport> {
  let checker = IntegrityChecker::open(db_path)?;
  Ok(checker.run_all())
}

pub fn log_check_report(report: &CheckReport) {
  for r in &report.results {
    if r.passed() {
      tracing::info!("  PASS  {}", r.name);
    } else {
      tracing::error!("  FAIL  {}: {}", r.name, r.violations.join("; "));
    }
  }
  tracing::info!("{} passed, {} failed", report.passed(), report.failed());
}
