//! Ingest command implementation
//!
//! Runs the full pipeline per selected dataset: normalize, geocode,
//! validate, and load into the case sink, writing a JSON run log for each
//! dataset. A file-level failure is fatal for that dataset only; sibling
//! datasets still run, and the command exits non-zero if any failed.

use super::shared::{self, DatasetOutcome};
use crate::app::models::audit::RunMetadata;
use crate::app::services::case_loader::{BulkLoader, CaseSink, LoaderOptions, MemoryCaseSink};
use crate::app::services::location_resolver::{LocationResolver, LocationTables};
use crate::app::services::normalizer::{DatasetKind, NormalizeResult, Normalizer};
use crate::app::services::schema_validator::{SchemaValidator, ValidationSummary};
use crate::cli::args::IngestArgs;
use crate::config::Config;
use crate::constants::MAX_ERROR_SAMPLES;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Ingest command runner
pub fn run_ingest(args: IngestArgs) -> Result<()> {
    shared::setup_logging(args.verbose, args.quiet)?;

    let config = args.to_config();
    config.validate()?;
    config.ensure_processed_dir()?;

    let tables = load_tables(&config)?;
    let mut sink = MemoryCaseSink::new();

    let start = Instant::now();
    let mut outcomes = Vec::new();

    for kind in args.dataset_kinds() {
        let spinner = (!args.quiet).then(|| shared::dataset_spinner(kind.name()));

        let result = ingest_dataset(kind, &config, Arc::clone(&tables), &mut sink);

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                // A bad file fails its dataset only; keep going
                error!("{} ingestion failed: {}", kind.name(), e);
                outcomes.push(DatasetOutcome {
                    dataset: kind.name().to_string(),
                    records: 0,
                    successful: 0,
                    failed: 0,
                    duplicates: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    shared::print_summary(&outcomes, start.elapsed());
    info!("Case sink now holds {} records", sink.case_count());

    let failed_datasets = outcomes.iter().filter(|o| o.error.is_some()).count();
    if failed_datasets > 0 {
        return Err(Error::ingestion(format!(
            "{} of {} datasets failed",
            failed_datasets,
            outcomes.len()
        )));
    }
    Ok(())
}

/// Load the geocoding tables, or fall back to state centroids only
fn load_tables(config: &Config) -> Result<Arc<LocationTables>> {
    match &config.places_file {
        Some(path) => Ok(Arc::new(LocationTables::load_from_csv(path)?)),
        None => {
            warn!("No places lookup file configured; geocoding will use state centroids only");
            Ok(Arc::new(LocationTables::empty()))
        }
    }
}

/// Run the full pipeline for one dataset
fn ingest_dataset<S: CaseSink>(
    kind: DatasetKind,
    config: &Config,
    tables: Arc<LocationTables>,
    sink: &mut S,
) -> Result<DatasetOutcome> {
    let source_file = config.raw_data_dir.join(kind.source_filename());

    // 1. Parse and normalize
    let normalizer = Normalizer::new(kind);
    let NormalizeResult { mut records, stats } = normalizer.parse_file(&source_file)?;

    // 2. Geocode
    let mut resolver = LocationResolver::new(tables);
    let geocoding = resolver.resolve_all(&mut records);

    // 3. Validate
    let validator = SchemaValidator::new();
    let before = records.len();
    let (records, issues) = validator.validate(records);
    if !issues.is_empty() {
        warn!("Validation found {} issue entries", issues.len());
    }
    let validation = ValidationSummary::from_issues(&issues, records.len(), before - records.len());

    // 4. Load into the case sink
    let metadata = RunMetadata {
        parsing: Some(stats),
        geocoding: Some(geocoding.truncated(MAX_ERROR_SAMPLES)),
        validation: Some(validation),
    };
    let mut loader = BulkLoader::new(sink, LoaderOptions::from_config(config));
    let outcome = loader.load(&records, kind.data_source(), &source_file, metadata)?;

    Ok(DatasetOutcome {
        dataset: kind.name().to_string(),
        records: records.len(),
        successful: outcome.successful,
        failed: outcome.failed,
        duplicates: outcome.duplicates,
        error: None,
    })
}
