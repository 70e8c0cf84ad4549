//! Application constants for the outbreak processor
//!
//! This module contains dataset names and file mappings, external-id
//! settings, severity thresholds, and loader limits used throughout
//! the ingestion pipeline.

// =============================================================================
// Dataset Names and File Patterns
// =============================================================================

/// Supported surveillance dataset names
pub const DATASET_NAMES: &[&str] = &["commercial", "wild_bird", "mammal"];

/// Default datasets to ingest if none specified
pub const DEFAULT_DATASETS: &[&str] = &["commercial", "wild_bird", "mammal"];

/// Default source filenames within the raw data directory
pub mod dataset_files {
    pub const COMMERCIAL: &str = "commercial-backyard-flocks.csv";
    pub const WILD_BIRD: &str = "HPAI Detections in Wild Birds.csv";
    pub const MAMMAL: &str = "HPAI Detections in Mammals.csv";
}

// =============================================================================
// External Id Generation
// =============================================================================

/// External-id prefixes identifying the originating dataset
pub mod id_prefixes {
    pub const COMMERCIAL: &str = "COMM";
    pub const WILD_BIRD: &str = "WILD";
    pub const MAMMAL: &str = "MAMM";
}

/// Number of hex digest characters kept in an external id
pub const EXTERNAL_ID_HASH_LEN: usize = 12;

// =============================================================================
// Normalization Rules
// =============================================================================

/// Severity thresholds applied to `animals_affected` counts
pub mod severity_thresholds {
    /// At or below this count the outbreak is low severity
    pub const LOW_MAX: i64 = 100;

    /// At or below this count the outbreak is medium severity
    pub const MEDIUM_MAX: i64 = 10_000;

    /// At or below this count the outbreak is high severity; above is critical
    pub const HIGH_MAX: i64 = 50_000;
}

/// Species keywords marking a mammal detection as a domestic animal
pub const DOMESTIC_MAMMAL_KEYWORDS: &[&str] = &[
    "cat",
    "dog",
    "cattle",
    "pig",
    "alpaca",
    "llama",
    "goat",
    "sheep",
    "horse",
    "dairy cattle",
    "beef cattle",
];

/// Strict date format for commercial outbreak dates (e.g. "12-31-2024")
pub const COMMERCIAL_DATE_FORMAT: &str = "%m-%d-%Y";

/// Date formats tried in order for free-form wild-bird and mammal dates
pub const FLEXIBLE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Country default applied when a dataset carries no country column
pub const DEFAULT_COUNTRY: &str = "USA";

// =============================================================================
// Schema Validation
// =============================================================================

/// Fields the validator requires to be populated
pub const REQUIRED_FIELDS: &[&str] =
    &["case_date", "animal_category", "country", "data_source", "status"];

// =============================================================================
// Bulk Loader Limits
// =============================================================================

/// Number of records committed to the sink per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Maximum error entries retained on an import record
pub const MAX_ERROR_LOG_ENTRIES: usize = 100;

/// Maximum duplicate samples kept for the run log
pub const MAX_DUPLICATE_SAMPLES: usize = 20;

/// Maximum within-batch duplicate samples kept for the run log
pub const MAX_WITHIN_BATCH_SAMPLES: usize = 10;

/// Maximum error samples embedded in the run log
pub const MAX_ERROR_SAMPLES: usize = 20;

/// Chunk size for streaming file content hashes
pub const HASH_CHUNK_SIZE: usize = 4096;
