//! Outbreak Processor Library
//!
//! A Rust library for ingesting animal-disease surveillance CSV exports into
//! normalized case records suitable for mapping and analytics.
//!
//! This library provides tools for:
//! - Parsing per-dataset surveillance CSV files (commercial poultry, wild birds, mammals)
//! - Collapsing repeated detection rows into single aggregated case records
//! - Geocoding county/state location fields against offline centroid tables
//! - Validating records against the canonical case schema
//! - Bulk loading into a case sink with duplicate-safe, idempotent commit semantics
//! - Writing a structured JSON audit trail for every ingestion run

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod case_loader;
        pub mod location_resolver;
        pub mod normalizer;
        pub mod schema_validator;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CaseRecord, ImportRecord, StoredCase};
pub use config::Config;

/// Result type alias for the outbreak processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for surveillance ingestion operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Location lookup table error
    #[error("Location lookup error: {message}")]
    LocationLookup { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Case sink error surfaced past the loader boundary
    #[error("Case sink error: {message}")]
    Sink { message: String },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Unknown dataset name
    #[error("Unknown dataset: {dataset_name}")]
    UnknownDataset { dataset_name: String },

    /// One or more datasets failed during a multi-dataset run
    #[error("Ingestion error: {message}")]
    Ingestion { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a location lookup error
    pub fn location_lookup(message: impl Into<String>) -> Self {
        Self::LocationLookup {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a case sink error
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an unknown dataset error
    pub fn unknown_dataset(dataset_name: impl Into<String>) -> Self {
        Self::UnknownDataset {
            dataset_name: dataset_name.into(),
        }
    }

    /// Create an ingestion error
    pub fn ingestion(message: impl Into<String>) -> Self {
        Self::Ingestion {
            message: message.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Io {
            message: format!("JSON serialization failed: {}", error),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, error),
        }
    }
}
