//! Check command implementation
//!
//! Dry-run of the pipeline: parse, geocode, and validate the selected
//! datasets without loading anything or writing run logs. Useful for
//! inspecting a new export before committing it.

use super::shared;
use crate::app::services::location_resolver::{LocationResolver, LocationTables};
use crate::app::services::normalizer::{NormalizeResult, Normalizer};
use crate::app::services::schema_validator::{IssueSeverity, SchemaValidator};
use crate::cli::args::CheckArgs;
use crate::config::Config;
use crate::{Error, Result};
use colored::Colorize;
use std::sync::Arc;
use tracing::{error, warn};

/// Check command runner
pub fn run_check(args: CheckArgs) -> Result<()> {
    shared::setup_logging(args.verbose, false)?;

    let defaults = Config::default();
    let raw_data_dir = args.input_path.clone().unwrap_or(defaults.raw_data_dir);

    let tables = match &args.places_file {
        Some(path) => Arc::new(LocationTables::load_from_csv(path)?),
        None => {
            warn!("No places lookup file configured; geocoding will use state centroids only");
            Arc::new(LocationTables::empty())
        }
    };

    let mut failed_datasets = 0usize;
    let total_datasets = args.dataset_kinds().len();

    for kind in args.dataset_kinds() {
        let source_file = raw_data_dir.join(kind.source_filename());
        println!();
        println!("{} {}", "Checking".bold(), kind.name());

        let normalizer = Normalizer::new(kind);
        let NormalizeResult { mut records, stats } = match normalizer.parse_file(&source_file) {
            Ok(result) => result,
            Err(e) => {
                error!("{} check failed: {}", kind.name(), e);
                failed_datasets += 1;
                continue;
            }
        };

        let mut resolver = LocationResolver::new(Arc::clone(&tables));
        let geocoding = resolver.resolve_all(&mut records);

        let validator = SchemaValidator::new();
        let before = records.len();
        let (records, issues) = validator.validate(records);

        println!(
            "  {} rows -> {} records ({} merged, {} dropped for null dates)",
            stats.total_rows,
            records.len(),
            stats.rows_merged,
            before - records.len()
        );
        println!(
            "  geocoded {}/{} ({:.1}%)",
            geocoding.resolved,
            geocoding.total,
            geocoding.success_rate()
        );

        if issues.is_empty() {
            println!("  {}", "no validation issues".green());
        } else {
            for issue in &issues {
                let tag = match issue.severity {
                    IssueSeverity::Critical => "CRITICAL".red().bold(),
                    IssueSeverity::Error => "ERROR".red(),
                    IssueSeverity::Warning => "WARNING".yellow(),
                };
                println!("  {} [{}] {}", tag, issue.kind, issue.message);
            }
        }
    }

    println!();
    if failed_datasets > 0 {
        return Err(Error::ingestion(format!(
            "{} of {} datasets failed",
            failed_datasets, total_datasets
        )));
    }
    Ok(())
}
