//! Data models for surveillance case ingestion
//!
//! This module contains the canonical case record produced by the ingestion
//! pipeline, the vocabulary enums it is validated against, the fully-typed
//! record handed to the case sink, and the import audit record.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub mod audit;

// =============================================================================
// Vocabulary Enums
// =============================================================================

/// WOAH-style animal classification for a case record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalCategory {
    Poultry,
    DairyCattle,
    WildBird,
    WildMammal,
    DomesticMammal,
    Other,
}

impl AnimalCategory {
    /// All valid animal category values
    pub const ALL: &'static [AnimalCategory] = &[
        AnimalCategory::Poultry,
        AnimalCategory::DairyCattle,
        AnimalCategory::WildBird,
        AnimalCategory::WildMammal,
        AnimalCategory::DomesticMammal,
        AnimalCategory::Other,
    ];

    /// Canonical string value stored on case records
    pub fn as_str(self) -> &'static str {
        match self {
            AnimalCategory::Poultry => "poultry",
            AnimalCategory::DairyCattle => "dairy_cattle",
            AnimalCategory::WildBird => "wild_bird",
            AnimalCategory::WildMammal => "wild_mammal",
            AnimalCategory::DomesticMammal => "domestic_mammal",
            AnimalCategory::Other => "other",
        }
    }

    /// Check whether a string is a member of the vocabulary
    pub fn is_valid(value: &str) -> bool {
        Self::ALL.iter().any(|c| c.as_str() == value)
    }
}

impl FromStr for AnimalCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::data_validation(format!("invalid animal_category '{}'", s)))
    }
}

impl std::fmt::Display for AnimalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Investigation status of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Suspected,
    Confirmed,
    Resolved,
    UnderInvestigation,
}

impl CaseStatus {
    /// All valid case status values
    pub const ALL: &'static [CaseStatus] = &[
        CaseStatus::Suspected,
        CaseStatus::Confirmed,
        CaseStatus::Resolved,
        CaseStatus::UnderInvestigation,
    ];

    /// Canonical string value stored on case records
    pub fn as_str(self) -> &'static str {
        match self {
            CaseStatus::Suspected => "suspected",
            CaseStatus::Confirmed => "confirmed",
            CaseStatus::Resolved => "resolved",
            CaseStatus::UnderInvestigation => "under_investigation",
        }
    }

    /// Check whether a string is a member of the vocabulary
    pub fn is_valid(value: &str) -> bool {
        Self::ALL.iter().any(|s| s.as_str() == value)
    }
}

impl FromStr for CaseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::data_validation(format!("invalid status '{}'", s)))
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity tier derived from outbreak magnitude and species risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All valid severity values
    pub const ALL: &'static [Severity] = &[
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Canonical string value stored on case records
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Check whether a string is a member of the vocabulary
    pub fn is_valid(value: &str) -> bool {
        Self::ALL.iter().any(|s| s.as_str() == value)
    }

    /// Severity tier for an outbreak magnitude
    ///
    /// An unknown or zero count is treated as an individual detection.
    pub fn from_affected_count(affected: Option<i64>) -> Severity {
        use crate::constants::severity_thresholds::{HIGH_MAX, LOW_MAX, MEDIUM_MAX};

        match affected {
            None | Some(0) => Severity::Low,
            Some(n) if n <= LOW_MAX => Severity::Low,
            Some(n) if n <= MEDIUM_MAX => Severity::Medium,
            Some(n) if n <= HIGH_MAX => Severity::High,
            Some(_) => Severity::Critical,
        }
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::data_validation(format!("invalid severity '{}'", s)))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Originating surveillance program for a case record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Woah,
    Cdc,
    Usda,
    StateAgency,
    ManualEntry,
    Other,
}

impl DataSource {
    /// All valid data source values
    pub const ALL: &'static [DataSource] = &[
        DataSource::Woah,
        DataSource::Cdc,
        DataSource::Usda,
        DataSource::StateAgency,
        DataSource::ManualEntry,
        DataSource::Other,
    ];

    /// Canonical string value stored on case records
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Woah => "woah",
            DataSource::Cdc => "cdc",
            DataSource::Usda => "usda",
            DataSource::StateAgency => "state_agency",
            DataSource::ManualEntry => "manual_entry",
            DataSource::Other => "other",
        }
    }

    /// Check whether a string is a member of the vocabulary
    pub fn is_valid(value: &str) -> bool {
        Self::ALL.iter().any(|s| s.as_str() == value)
    }
}

impl FromStr for DataSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::data_validation(format!("invalid data_source '{}'", s)))
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Case Record Structure
// =============================================================================

/// Canonical case record produced by the normalization pipeline
///
/// This is the currency of the pipeline between the normalizer and the
/// loader. Vocabulary fields are carried as their canonical string values so
/// the schema validator can report membership violations and the loader can
/// count coercion failures without either stage aborting a run; the typed
/// form handed to the sink is [`StoredCase`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Deterministic hash-derived identifier; the deduplication key
    pub external_id: String,

    /// Date of the outbreak or detection; rows without one are dropped by
    /// the validator
    pub case_date: Option<NaiveDate>,

    /// Date the detection was reported or confirmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_date: Option<NaiveDate>,

    /// Investigation status (CaseStatus vocabulary)
    pub status: String,

    /// Severity tier (Severity vocabulary); derived when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// WOAH category (AnimalCategory vocabulary)
    pub animal_category: String,

    /// Free-text species or flock type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_species: Option<String>,

    /// Number of animals affected by this event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animals_affected: Option<i64>,

    /// Number of animals dead; soft rule dead <= affected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animals_dead: Option<i64>,

    /// Country of the detection (required)
    pub country: String,

    /// State or province name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,

    /// County name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,

    /// City or place name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Latitude in decimal degrees, -90 to 90
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees, -180 to 180
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Originating program (DataSource vocabulary)
    pub data_source: String,

    /// Free-text description, including aggregation notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Dataset-specific fields outside the canonical schema (e.g. strain)
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub extra_metadata: BTreeMap<String, String>,
}

impl Default for CaseRecord {
    fn default() -> Self {
        Self {
            external_id: String::new(),
            case_date: None,
            report_date: None,
            status: String::new(),
            severity: None,
            animal_category: String::new(),
            animal_species: None,
            animals_affected: None,
            animals_dead: None,
            country: String::new(),
            state_province: None,
            county: None,
            city: None,
            latitude: None,
            longitude: None,
            data_source: String::new(),
            description: None,
            extra_metadata: BTreeMap::new(),
        }
    }
}

impl CaseRecord {
    /// Check whether coordinates have already been resolved
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

// =============================================================================
// Stored Case Structure
// =============================================================================

/// Fully-typed case record accepted by a case sink
///
/// Construction from a [`CaseRecord`] is where vocabulary strings become
/// enums and the mandatory case date becomes non-optional; a failure here is
/// counted by the loader as a failed row, never a fatal error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCase {
    pub external_id: String,
    pub case_date: NaiveDate,
    pub report_date: Option<NaiveDate>,
    pub status: CaseStatus,
    pub severity: Severity,
    pub animal_category: AnimalCategory,
    pub animal_species: Option<String>,
    pub animals_affected: Option<i64>,
    pub animals_dead: Option<i64>,
    pub country: String,
    pub state_province: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub data_source: DataSource,
    pub description: Option<String>,
    pub extra_metadata: BTreeMap<String, String>,
}

impl TryFrom<&CaseRecord> for StoredCase {
    type Error = Error;

    fn try_from(record: &CaseRecord) -> Result<Self> {
        let case_date = record.case_date.ok_or_else(|| {
            Error::data_validation(format!(
                "case_date is required (external_id {})",
                record.external_id
            ))
        })?;

        if record.external_id.trim().is_empty() {
            return Err(Error::data_validation("external_id cannot be empty"));
        }

        let severity = match &record.severity {
            Some(value) => value.parse::<Severity>()?,
            None => Severity::from_affected_count(record.animals_affected),
        };

        Ok(Self {
            external_id: record.external_id.clone(),
            case_date,
            report_date: record.report_date,
            status: record.status.parse()?,
            severity,
            animal_category: record.animal_category.parse()?,
            animal_species: record.animal_species.clone(),
            animals_affected: record.animals_affected,
            animals_dead: record.animals_dead,
            country: record.country.clone(),
            state_province: record.state_province.clone(),
            county: record.county.clone(),
            city: record.city.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            data_source: record.data_source.parse()?,
            description: record.description.clone(),
            extra_metadata: record.extra_metadata.clone(),
        })
    }
}

// =============================================================================
// Import Audit Record
// =============================================================================

/// Lifecycle status of an import attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Pending,
    InProgress,
    Completed,
    CompletedWithErrors,
}

impl ImportStatus {
    /// Canonical string value
    pub fn as_str(self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::InProgress => "in_progress",
            ImportStatus::Completed => "completed",
            ImportStatus::CompletedWithErrors => "completed_with_errors",
        }
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit record for one (source file content) ingestion attempt
///
/// Created with status `in_progress` when a load begins and updated exactly
/// once when it finishes. A crash leaves the record `in_progress`, which is
/// safe: re-running re-hashes the file and only short-circuits on a
/// `completed` match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Data source tag for the dataset being imported
    pub source: String,

    /// Name of the source file
    pub filename: String,

    /// SHA-256 hash of the source file content
    pub file_hash: String,

    /// Total records submitted to the loader
    pub total_rows: usize,

    /// Records durably inserted
    pub successful_rows: usize,

    /// Records that failed construction or insertion
    pub failed_rows: usize,

    /// Records identified as duplicates (within-batch or cross-batch)
    pub duplicate_rows: usize,

    /// Current lifecycle status
    pub status: ImportStatus,

    /// When the load started
    pub started_at: DateTime<Utc>,

    /// When the load finished, if it has
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Wall-clock duration of the load in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,

    /// Truncated log of per-record errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<String>,
}

impl ImportRecord {
    /// Create a new in-progress import record
    pub fn begin(
        source: impl Into<String>,
        filename: impl Into<String>,
        file_hash: impl Into<String>,
        total_rows: usize,
    ) -> Self {
        Self {
            source: source.into(),
            filename: filename.into(),
            file_hash: file_hash.into(),
            total_rows,
            successful_rows: 0,
            failed_rows: 0,
            duplicate_rows: 0,
            status: ImportStatus::InProgress,
            started_at: Utc::now(),
            completed_at: None,
            duration_seconds: None,
            error_log: None,
        }
    }

    /// Verify the row accounting identity total = successful + failed + duplicates
    pub fn accounts_for_all_rows(&self) -> bool {
        self.total_rows == self.successful_rows + self.failed_rows + self.duplicate_rows
    }
}
