//! `narrative-check` — run the integrity battery against the built database.
//!
//! Exits 0 when every check passes and 1 otherwise, including when the
//! database does not exist.

use std::process::ExitCode;

use clap::Parser;
use narrative_cli::{Settings, init_tracing, log_check_report, run_checks};

#[derive(Parser)]
#[command(author, version, about = "Verify integrity of the narrative corpus database")]
struct Cli {}

fn main() -> ExitCode {
  init_tracing();
  let _cli = Cli::parse();

  let report = Settings::load().and_then(|settings| run_checks(&settings.db_path));
  match report {
    Ok(report) => {
      log_check_report(&report);
      if report.is_ok() {
        ExitCode::SUCCESS
      } else {
        ExitCode::FAILURE
      }
    }
    Err(e) => {
      tracing::error!("  FAIL  {e:#}");
      ExitCode::FAILURE
    }
  }
}
