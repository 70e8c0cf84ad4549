//! Per-dataset normalization pipeline
//!
//! Each surveillance export has its own header set, date format, and
//! duplicate semantics, but every dataset runs the same pipeline shape:
//!
//! 1. Read rows with whitespace-trimmed headers
//! 2. Dataset transform: parse dates, title-case locations/species, coerce
//!    magnitudes (failures become null, not errors)
//! 3. Aggregate duplicate rows on the dataset's grouping key (before column
//!    mapping, so grouping sees the source fields)
//! 4. Map to canonical case-record fields and apply dataset defaults
//! 5. Derive severity and the deterministic external id
//!
//! Datasets differ only by static configuration and transform functions in
//! [`commercial`], [`wild_bird`], and [`mammal`]; there is no subclass
//! hierarchy to trace through.

use crate::app::models::CaseRecord;
use crate::constants::{dataset_files, id_prefixes, DATASET_NAMES};
use crate::{Error, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

pub mod aggregate;
pub mod commercial;
pub mod external_id;
pub mod field_parsers;
pub mod mammal;
pub mod stats;
pub mod wild_bird;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use stats::ParseStats;

use aggregate::{aggregate_rows, merged_row_count};
use field_parsers::ColumnMap;

// =============================================================================
// Dataset Kinds
// =============================================================================

/// The recognized surveillance dataset shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// USDA commercial and backyard poultry flock outbreaks
    Commercial,
    /// USDA HPAI detections in wild birds
    WildBird,
    /// USDA HPAI detections in mammals
    Mammal,
}

impl DatasetKind {
    /// All recognized dataset kinds
    pub const ALL: &'static [DatasetKind] = &[
        DatasetKind::Commercial,
        DatasetKind::WildBird,
        DatasetKind::Mammal,
    ];

    /// Canonical dataset name used in CLI arguments and log filenames
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Commercial => "commercial",
            DatasetKind::WildBird => "wild_bird",
            DatasetKind::Mammal => "mammal",
        }
    }

    /// External-id prefix for this dataset
    pub fn id_prefix(self) -> &'static str {
        match self {
            DatasetKind::Commercial => id_prefixes::COMMERCIAL,
            DatasetKind::WildBird => id_prefixes::WILD_BIRD,
            DatasetKind::Mammal => id_prefixes::MAMMAL,
        }
    }

    /// Default source filename within the raw data directory
    pub fn source_filename(self) -> &'static str {
        match self {
            DatasetKind::Commercial => dataset_files::COMMERCIAL,
            DatasetKind::WildBird => dataset_files::WILD_BIRD,
            DatasetKind::Mammal => dataset_files::MAMMAL,
        }
    }

    /// Data source tag applied to this dataset's records
    pub fn data_source(self) -> &'static str {
        // All three priority feeds are USDA exports
        "usda"
    }
}

impl FromStr for DatasetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "commercial" => Ok(DatasetKind::Commercial),
            "wild_bird" => Ok(DatasetKind::WildBird),
            "mammal" => Ok(DatasetKind::Mammal),
            other => Err(Error::unknown_dataset(format!(
                "{} (expected one of: {})",
                other,
                DATASET_NAMES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Intermediate Row
// =============================================================================

/// Typed canonical values extracted from one source row, before aggregation
///
/// Every field a dataset can populate is an explicit `Option`; fields a
/// dataset never carries simply stay `None`. Source rows are read once into
/// this form and discarded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DraftRow {
    pub county: Option<String>,
    pub state_province: Option<String>,
    pub case_date: Option<NaiveDate>,
    pub report_date: Option<NaiveDate>,
    pub species: Option<String>,
    pub affected: Option<i64>,
    pub metadata: BTreeMap<String, String>,
}

// =============================================================================
// Normalizer
// =============================================================================

/// Result of normalizing one dataset file
#[derive(Debug, Clone)]
pub struct NormalizeResult {
    /// Normalized, aggregated case records
    pub records: Vec<CaseRecord>,

    /// Parsing statistics for the run
    pub stats: ParseStats,
}

/// Dataset-configured normalizer running the shared pipeline
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    kind: DatasetKind,
}

impl Normalizer {
    /// Create a normalizer for a dataset kind
    pub fn new(kind: DatasetKind) -> Self {
        Self { kind }
    }

    /// The dataset this normalizer is configured for
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Parse and normalize a source CSV file into case records
    pub fn parse_file(&self, path: &Path) -> Result<NormalizeResult> {
        if !path.exists() {
            return Err(Error::file_not_found(path.display().to_string()));
        }

        info!(
            "Parsing {} dataset from {}",
            self.kind.name(),
            path.display()
        );

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                Error::csv_parsing(
                    path.display().to_string(),
                    "failed to open dataset file",
                    Some(e),
                )
            })?;

        let headers = reader
            .headers()
            .map_err(|e| {
                Error::csv_parsing(
                    path.display().to_string(),
                    "failed to read header row",
                    Some(e),
                )
            })?
            .clone();
        let mapping = ColumnMap::from_headers(&headers);

        let mut stats = ParseStats::new();
        let mut raw_rows: Vec<StringRecord> = Vec::new();
        for (row_number, result) in reader.records().enumerate() {
            match result {
                Ok(record) => raw_rows.push(record),
                Err(e) => {
                    stats
                        .errors
                        .push(format!("row {}: {}", row_number + 1, e));
                }
            }
        }
        stats.total_rows = raw_rows.len();

        if stats.has_errors() {
            warn!(
                "Skipped {} unreadable rows in {}",
                stats.errors.len(),
                path.display()
            );
        }

        let records = self.normalize_rows(&raw_rows, &mapping, &mut stats);
        stats.records_normalized = records.len();

        info!(
            "Normalized {} rows into {} case records ({} merged by aggregation)",
            stats.total_rows, stats.records_normalized, stats.rows_merged
        );

        Ok(NormalizeResult { records, stats })
    }

    /// Run the transform / aggregate / map stages over raw rows
    pub fn normalize_rows(
        &self,
        raw_rows: &[StringRecord],
        mapping: &ColumnMap,
        stats: &mut ParseStats,
    ) -> Vec<CaseRecord> {
        let rows = match self.kind {
            DatasetKind::Commercial => commercial::extract_rows(raw_rows, mapping, stats),
            DatasetKind::WildBird => wild_bird::extract_rows(raw_rows, mapping, stats),
            DatasetKind::Mammal => mammal::extract_rows(raw_rows, mapping, stats),
        };

        let key_fn: fn(&DraftRow) -> String = match self.kind {
            DatasetKind::Commercial => commercial::group_key,
            DatasetKind::WildBird => wild_bird::group_key,
            DatasetKind::Mammal => mammal::group_key,
        };

        let groups = aggregate_rows(rows, key_fn);
        stats.rows_merged = merged_row_count(&groups);

        let finish_fn: fn(aggregate::AggregatedGroup) -> CaseRecord = match self.kind {
            DatasetKind::Commercial => commercial::finish,
            DatasetKind::WildBird => wild_bird::finish,
            DatasetKind::Mammal => mammal::finish,
        };

        groups.into_iter().map(finish_fn).collect()
    }
}
