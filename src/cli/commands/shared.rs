//! Shared helpers for CLI commands: logging setup and summary output

use crate::Result;
use colored::Colorize;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize tracing output for a command run
///
/// `RUST_LOG` overrides the level derived from the verbosity flags.
pub fn setup_logging(verbose: bool, quiet: bool) -> Result<()> {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: tests may initialize more than once
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    Ok(())
}

/// Create the spinner shown while a dataset is being processed
pub fn dataset_spinner(dataset: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Processing {} dataset...", dataset));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Per-dataset result reported in the final summary
#[derive(Debug, Clone)]
pub struct DatasetOutcome {
    pub dataset: String,
    pub records: usize,
    pub successful: usize,
    pub failed: usize,
    pub duplicates: usize,
    pub error: Option<String>,
}

/// Print the end-of-run summary table
pub fn print_summary(outcomes: &[DatasetOutcome], elapsed: Duration) {
    println!();
    println!("{}", "Ingestion Summary".bold());
    println!("{}", "=".repeat(60));

    for outcome in outcomes {
        match &outcome.error {
            Some(error) => {
                println!(
                    "  {:<12} {}: {}",
                    outcome.dataset,
                    "FAILED".red().bold(),
                    error
                );
            }
            None => {
                println!(
                    "  {:<12} {} inserted, {} failed, {} duplicates ({} records)",
                    outcome.dataset,
                    outcome.successful.to_string().green(),
                    if outcome.failed > 0 {
                        outcome.failed.to_string().red()
                    } else {
                        outcome.failed.to_string().normal()
                    },
                    outcome.duplicates.to_string().yellow(),
                    outcome.records
                );
            }
        }
    }

    println!("{}", "=".repeat(60));
    println!("  Completed in {}", HumanDuration(elapsed));
    println!();
}
