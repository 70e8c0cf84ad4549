//! Configuration management and validation.
//!
//! Provides the ingestion configuration structure shared by the CLI
//! commands: data directories, the location lookup file, and loader
//! batching parameters.

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory containing the raw dataset CSV exports
    pub raw_data_dir: PathBuf,

    /// Directory where run logs are written
    pub processed_dir: PathBuf,

    /// Incorporated-places centroid CSV for the location resolver
    ///
    /// When absent, geocoding falls back to state centroids only.
    pub places_file: Option<PathBuf>,

    /// Number of records committed to the sink per batch
    pub batch_size: usize,

    /// Whether to write a JSON run log after each load
    pub write_run_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_root = default_data_dir();
        Self {
            raw_data_dir: data_root.join("raw"),
            processed_dir: data_root.join("processed"),
            places_file: None,
            batch_size: DEFAULT_BATCH_SIZE,
            write_run_logs: true,
        }
    }
}

impl Config {
    /// Validate configuration values before a run
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::configuration("batch_size must be greater than zero"));
        }

        if !self.raw_data_dir.exists() {
            return Err(Error::configuration(format!(
                "raw data directory does not exist: {}",
                self.raw_data_dir.display()
            )));
        }

        if let Some(places) = &self.places_file {
            if !places.exists() {
                return Err(Error::configuration(format!(
                    "places lookup file does not exist: {}",
                    places.display()
                )));
            }
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }

    /// Ensure the processed-data directory exists, creating it if needed
    pub fn ensure_processed_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.processed_dir)
            .map_err(|e| Error::io("failed to create processed data directory", e))
    }
}

/// Default per-user data directory for the processor
///
/// Falls back to the current directory when no platform data dir exists.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("outbreak-processor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.write_run_logs);
        assert!(config.places_file.is_none());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = Config {
            batch_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_raw_dir_rejected() {
        let config = Config {
            raw_data_dir: PathBuf::from("/nonexistent/raw/dir"),
            batch_size: 10,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
