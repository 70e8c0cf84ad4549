//! Bulk loader for validated case records
//!
//! The loader is the only pipeline stage with durable side effects. It
//! computes the source file's content hash, skips files already imported,
//! commits records in fixed-size batches with duplicate-safe semantics,
//! and records an import audit trail plus a JSON run log.
//!
//! # Idempotency
//!
//! Re-running on an unchanged file is a no-op: the content hash matches a
//! completed import and the whole file is reported as duplicates without
//! row-level evaluation. Re-running on a partially-new file inserts only
//! the unseen external ids; everything previously persisted surfaces as a
//! cross-batch duplicate via the per-record fallback path. Records are
//! never double-inserted.

use crate::app::models::audit::{
    DuplicateKind, DuplicateSample, DuplicateSamples, ImportSummary, IngestLog, LoadError,
    RunMetadata,
};
use crate::app::models::{CaseRecord, ImportRecord, ImportStatus, StoredCase};
use crate::config::Config;
use crate::constants::{
    DEFAULT_BATCH_SIZE, HASH_CHUNK_SIZE, MAX_DUPLICATE_SAMPLES, MAX_ERROR_LOG_ENTRIES,
    MAX_ERROR_SAMPLES, MAX_WITHIN_BATCH_SAMPLES,
};
use crate::{Error, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod audit_writer;
pub mod memory_sink;
pub mod sink;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use memory_sink::MemoryCaseSink;
pub use sink::{CaseSink, SinkError, SinkResult};

// =============================================================================
// Loader Options and Outcome
// =============================================================================

/// Loader tuning and output settings
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Records committed per batch
    pub batch_size: usize,

    /// Directory for run-log documents
    pub processed_dir: PathBuf,

    /// Whether to write a JSON run log after the load
    pub write_run_log: bool,
}

impl LoaderOptions {
    /// Build loader options from the pipeline configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            processed_dir: config.processed_dir.clone(),
            write_run_log: config.write_run_logs,
        }
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            processed_dir: PathBuf::from("."),
            write_run_log: false,
        }
    }
}

/// Counts and artifacts from one load
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Records durably inserted
    pub successful: usize,

    /// Records that failed construction or insertion
    pub failed: usize,

    /// Records identified as duplicates
    pub duplicates: usize,

    /// Whether the whole file was skipped as a previously completed import
    pub skipped_duplicate_file: bool,

    /// Path of the run log, when one was written
    pub log_path: Option<PathBuf>,
}

// =============================================================================
// Bulk Loader
// =============================================================================

/// Loads validated case records into a case sink with audit tracking
pub struct BulkLoader<'a, S: CaseSink> {
    sink: &'a mut S,
    options: LoaderOptions,
}

impl<'a, S: CaseSink> BulkLoader<'a, S> {
    /// Create a loader over a case sink
    pub fn new(sink: &'a mut S, options: LoaderOptions) -> Self {
        Self { sink, options }
    }

    /// Compute the SHA-256 content hash of a source file
    pub fn file_hash(path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path.display().to_string())
            } else {
                Error::io(format!("failed to open {}", path.display()), e)
            }
        })?;

        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; HASH_CHUNK_SIZE];
        loop {
            let read = reader
                .read(&mut buffer)
                .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Load records originating from `source_file` into the sink
    ///
    /// Returns `(successful, failed, duplicates)` counts in the outcome and
    /// persists an [`ImportRecord`] keyed by the file's content hash.
    pub fn load(
        &mut self,
        records: &[CaseRecord],
        source: &str,
        source_file: &Path,
        metadata: RunMetadata,
    ) -> Result<LoadOutcome> {
        let start = Instant::now();
        info!("Loading {} records into case sink", records.len());

        let file_hash = Self::file_hash(source_file)?;
        let filename = source_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source_file.display().to_string());

        // Whole-file short circuit: this exact content already imported
        if self
            .sink
            .has_completed_import(&file_hash)
            .map_err(|e| Error::sink(e.to_string()))?
        {
            warn!(
                "File already imported (hash {}...), skipping {} records",
                &file_hash[..12.min(file_hash.len())],
                records.len()
            );
            return Ok(LoadOutcome {
                successful: 0,
                failed: 0,
                duplicates: records.len(),
                skipped_duplicate_file: true,
                log_path: None,
            });
        }

        let mut import = ImportRecord::begin(source, filename, file_hash.clone(), records.len());
        let import_id = self
            .sink
            .record_import(&import)
            .map_err(|e| Error::sink(e.to_string()))?;

        let mut successful = 0usize;
        let mut failed = 0usize;
        let mut duplicates = 0usize;
        let mut errors: Vec<LoadError> = Vec::new();
        let mut samples: Vec<DuplicateSample> = Vec::new();

        for (batch_number, batch) in records.chunks(self.options.batch_size).enumerate() {
            // Within-batch dedup by external id, keeping the first occurrence
            let mut seen: HashSet<&str> = HashSet::new();
            let mut unique: Vec<&CaseRecord> = Vec::with_capacity(batch.len());
            let mut batch_duplicates = 0usize;

            for record in batch {
                let external_id = record.external_id.as_str();
                if !external_id.is_empty() && seen.contains(external_id) {
                    batch_duplicates += 1;
                    duplicates += 1;
                    let within = samples
                        .iter()
                        .filter(|s| s.kind == DuplicateKind::WithinBatch)
                        .count();
                    if within < MAX_WITHIN_BATCH_SAMPLES {
                        samples.push(DuplicateSample::from_record(
                            DuplicateKind::WithinBatch,
                            record,
                        ));
                    }
                } else {
                    if !external_id.is_empty() {
                        seen.insert(external_id);
                    }
                    unique.push(record);
                }
            }

            if batch_duplicates > 0 {
                info!(
                    "Batch {}: removed {} within-batch duplicates",
                    batch_number + 1,
                    batch_duplicates
                );
            }

            // Construct sink-typed cases; coercion failures are per-record,
            // never batch-fatal
            let mut cases: Vec<StoredCase> = Vec::with_capacity(unique.len());
            for record in unique {
                match StoredCase::try_from(record) {
                    Ok(case) => cases.push(case),
                    Err(e) => {
                        failed += 1;
                        errors.push(LoadError::from_record(record, e.to_string()));
                    }
                }
            }

            if cases.is_empty() {
                continue;
            }

            match self.sink.insert_batch(&cases) {
                Ok(()) => {
                    successful += cases.len();
                    debug!(
                        "Inserted batch {}: {} records",
                        batch_number + 1,
                        cases.len()
                    );
                }
                Err(e) if e.is_unique_violation() => {
                    // Some external id exists from a prior batch or import;
                    // retry one record at a time so one conflict cannot
                    // block the rest of the batch
                    for case in &cases {
                        match self.sink.insert_case(case) {
                            Ok(()) => successful += 1,
                            Err(e) if e.is_unique_violation() => {
                                duplicates += 1;
                                if samples.len() < MAX_DUPLICATE_SAMPLES {
                                    samples.push(DuplicateSample::from_stored(
                                        DuplicateKind::CrossBatch,
                                        case,
                                    ));
                                }
                            }
                            Err(e) => {
                                failed += 1;
                                errors.push(LoadError {
                                    external_id: case.external_id.clone(),
                                    species: case.animal_species.clone(),
                                    date: Some(case.case_date),
                                    message: e.to_string(),
                                });
                            }
                        }
                    }
                }
                Err(e) => {
                    failed += cases.len();
                    warn!("Batch {} failed: {}", batch_number + 1, e);
                    if let Some(first) = cases.first() {
                        errors.push(LoadError {
                            external_id: first.external_id.clone(),
                            species: first.animal_species.clone(),
                            date: Some(first.case_date),
                            message: format!("batch insert failed: {}", e),
                        });
                    }
                }
            }
        }

        let duration = start.elapsed().as_secs_f64();

        import.successful_rows = successful;
        import.failed_rows = failed;
        import.duplicate_rows = duplicates;
        import.status = if failed == 0 {
            ImportStatus::Completed
        } else {
            ImportStatus::CompletedWithErrors
        };
        import.completed_at = Some(Utc::now());
        import.duration_seconds = Some(duration);
        if !errors.is_empty() {
            import.error_log = Some(
                errors
                    .iter()
                    .take(MAX_ERROR_LOG_ENTRIES)
                    .map(|e| format!("{}: {}", e.message, e.external_id))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        self.sink
            .finish_import(import_id, &import)
            .map_err(|e| Error::sink(e.to_string()))?;

        info!(
            "Import summary: {} successful, {} failed, {} duplicates in {:.2}s",
            successful, failed, duplicates, duration
        );

        let log_path = if self.options.write_run_log {
            let dataset = audit_writer::dataset_name_for(source_file, source);
            let (within_batch, cross_batch): (Vec<_>, Vec<_>) = samples
                .into_iter()
                .partition(|s| s.kind == DuplicateKind::WithinBatch);

            let log = IngestLog {
                timestamp: Utc::now(),
                dataset: dataset.clone(),
                source_file: source_file.display().to_string(),
                file_hash,
                parsing: metadata.parsing,
                geocoding: metadata.geocoding,
                validation: metadata.validation,
                import: ImportSummary {
                    successful,
                    failed,
                    duplicates,
                    total_records: records.len(),
                    duration_seconds: (duration * 100.0).round() / 100.0,
                },
                duplicate_samples: DuplicateSamples {
                    within_batch,
                    cross_batch,
                },
                error_samples: errors.into_iter().take(MAX_ERROR_SAMPLES).collect(),
            };

            Some(audit_writer::write_run_log(
                &self.options.processed_dir,
                &dataset,
                &log,
            )?)
        } else {
            None
        };

        Ok(LoadOutcome {
            successful,
            failed,
            duplicates,
            skipped_duplicate_file: false,
            log_path,
        })
    }
}
