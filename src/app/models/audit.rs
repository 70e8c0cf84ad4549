//! Data models for the ingestion run log
//!
//! This module contains the structures serialized into the per-run JSON
//! audit document written alongside each bulk load, capturing parsing,
//! geocoding, validation, and import outcomes in one place.

use crate::app::models::{CaseRecord, StoredCase};
use crate::app::services::location_resolver::GeocodeStats;
use crate::app::services::normalizer::ParseStats;
use crate::app::services::schema_validator::ValidationSummary;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Run Log Document
// =============================================================================

/// Complete audit payload for one ingestion run
///
/// One of these is written as `{dataset}-log_{timestamp}.json` to the
/// processed-data area at the end of every load. It is the durable audit
/// trail independent of the case sink itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestLog {
    /// When the log was written
    pub timestamp: DateTime<Utc>,

    /// Dataset name derived from the source filename
    pub dataset: String,

    /// Path of the source file that was ingested
    pub source_file: String,

    /// SHA-256 content hash of the source file
    pub file_hash: String,

    /// Parsing stage statistics, when supplied by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsing: Option<ParseStats>,

    /// Geocoding stage statistics, when supplied by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocoding: Option<GeocodeStats>,

    /// Validation stage summary, when supplied by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationSummary>,

    /// Import counts and timing
    pub import: ImportSummary,

    /// Sample duplicate records split by where they were detected
    pub duplicate_samples: DuplicateSamples,

    /// Sample per-record load errors
    pub error_samples: Vec<LoadError>,
}

/// Import counts for the run log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub successful: usize,
    pub failed: usize,
    pub duplicates: usize,
    pub total_records: usize,
    pub duration_seconds: f64,
}

// =============================================================================
// Stage Metadata
// =============================================================================

/// Upstream stage statistics handed to the loader for the run log
///
/// The loader does not recompute these; it records whatever the caller
/// observed while parsing, geocoding, and validating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsing: Option<ParseStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocoding: Option<GeocodeStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationSummary>,
}

// =============================================================================
// Duplicate and Error Samples
// =============================================================================

/// Where in the load a duplicate external id was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateKind {
    /// Repeated external id inside a single batch
    WithinBatch,
    /// External id already persisted by a prior batch or prior import
    CrossBatch,
}

/// Duplicate samples for the run log, split by detection point
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateSamples {
    pub within_batch: Vec<DuplicateSample>,
    pub cross_batch: Vec<DuplicateSample>,
}

impl DuplicateSamples {
    /// Total number of samples retained
    pub fn len(&self) -> usize {
        self.within_batch.len() + self.cross_batch.len()
    }

    /// Whether any samples were retained
    pub fn is_empty(&self) -> bool {
        self.within_batch.is_empty() && self.cross_batch.is_empty()
    }
}

/// Identifying fields of one duplicate record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateSample {
    pub kind: DuplicateKind,
    pub external_id: String,
    pub species: Option<String>,
    pub date: Option<NaiveDate>,
    pub county: Option<String>,
    pub state: Option<String>,
}

impl DuplicateSample {
    /// Build a sample from a pipeline record
    pub fn from_record(kind: DuplicateKind, record: &CaseRecord) -> Self {
        Self {
            kind,
            external_id: record.external_id.clone(),
            species: record.animal_species.clone(),
            date: record.case_date,
            county: record.county.clone(),
            state: record.state_province.clone(),
        }
    }

    /// Build a sample from a sink-typed record
    pub fn from_stored(kind: DuplicateKind, case: &StoredCase) -> Self {
        Self {
            kind,
            external_id: case.external_id.clone(),
            species: case.animal_species.clone(),
            date: Some(case.case_date),
            county: case.county.clone(),
            state: case.state_province.clone(),
        }
    }
}

/// One per-record load failure with the fields needed to find the row again
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadError {
    pub external_id: String,
    pub species: Option<String>,
    pub date: Option<NaiveDate>,
    pub message: String,
}

impl LoadError {
    /// Build an error entry from the offending record
    pub fn from_record(record: &CaseRecord, message: impl Into<String>) -> Self {
        Self {
            external_id: record.external_id.clone(),
            species: record.animal_species.clone(),
            date: record.case_date,
            message: message.into(),
        }
    }
}
