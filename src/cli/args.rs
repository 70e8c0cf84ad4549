//! Command-line argument definitions for the outbreak processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::app::services::normalizer::DatasetKind;
use crate::config::Config;
use crate::constants::{DATASET_NAMES, DEFAULT_BATCH_SIZE};
use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the surveillance ingestion processor
///
/// Ingests animal-disease surveillance CSV exports into normalized,
/// geocoded, validated case records with duplicate-safe loading and a
/// JSON audit trail per run.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "outbreak-processor",
    version,
    about = "Ingest animal-disease surveillance CSV exports into normalized case records",
    long_about = "Processes commercial poultry, wild-bird, and mammal surveillance CSV exports \
                  through per-dataset normalization, duplicate aggregation, offline geocoding, \
                  and schema validation, then bulk-loads the results with idempotent, \
                  duplicate-safe commit semantics and a structured JSON audit log per run."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the full ingestion pipeline and load records into the case sink
    Ingest(IngestArgs),
    /// Parse, geocode, and validate datasets without loading anything
    Check(CheckArgs),
}

/// Arguments for the ingest command
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// Input directory containing the raw dataset CSV exports
    ///
    /// Expected files: commercial-backyard-flocks.csv,
    /// "HPAI Detections in Wild Birds.csv", "HPAI Detections in Mammals.csv".
    /// Defaults to the per-user data directory.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Input directory containing raw dataset CSV files"
    )]
    pub input_path: Option<PathBuf>,

    /// Output directory for run-log JSON documents
    ///
    /// Created if it does not exist. Defaults to the per-user data directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output directory for ingestion run logs"
    )]
    pub output_path: Option<PathBuf>,

    /// Incorporated-places centroid CSV for county/city geocoding
    ///
    /// Without it, geocoding falls back to state centroids only.
    #[arg(
        long = "places",
        value_name = "FILE",
        help = "Incorporated-places centroid CSV for geocoding lookups"
    )]
    pub places_file: Option<PathBuf>,

    /// Specific datasets to ingest (comma-separated list)
    ///
    /// Available datasets: commercial, wild_bird, mammal.
    /// If not specified, all datasets are ingested.
    #[arg(
        short = 'd',
        long = "datasets",
        value_name = "LIST",
        help = "Comma-separated list of datasets to ingest"
    )]
    pub datasets: Option<DatasetList>,

    /// Number of records committed to the sink per batch
    #[arg(
        long = "batch-size",
        value_name = "N",
        default_value_t = DEFAULT_BATCH_SIZE,
        help = "Records committed to the case sink per batch"
    )]
    pub batch_size: usize,

    /// Skip writing the JSON run log
    #[arg(long = "no-run-log", help = "Skip writing the JSON run log")]
    pub no_run_log: bool,

    /// Enable debug-level logging
    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet", help = "Only log warnings and errors")]
    pub quiet: bool,
}

impl IngestArgs {
    /// Dataset kinds selected for this run
    pub fn dataset_kinds(&self) -> Vec<DatasetKind> {
        match &self.datasets {
            Some(list) => list.0.clone(),
            None => DatasetKind::ALL.to_vec(),
        }
    }

    /// Build the pipeline configuration from these arguments
    pub fn to_config(&self) -> Config {
        let defaults = Config::default();
        Config {
            raw_data_dir: self
                .input_path
                .clone()
                .unwrap_or(defaults.raw_data_dir),
            processed_dir: self
                .output_path
                .clone()
                .unwrap_or(defaults.processed_dir),
            places_file: self.places_file.clone(),
            batch_size: self.batch_size,
            write_run_logs: !self.no_run_log,
        }
    }
}

/// Arguments for the check command
#[derive(Debug, Clone, Parser)]
pub struct CheckArgs {
    /// Input directory containing the raw dataset CSV exports
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Input directory containing raw dataset CSV files"
    )]
    pub input_path: Option<PathBuf>,

    /// Incorporated-places centroid CSV for county/city geocoding
    #[arg(
        long = "places",
        value_name = "FILE",
        help = "Incorporated-places centroid CSV for geocoding lookups"
    )]
    pub places_file: Option<PathBuf>,

    /// Specific datasets to check (comma-separated list)
    #[arg(
        short = 'd',
        long = "datasets",
        value_name = "LIST",
        help = "Comma-separated list of datasets to check"
    )]
    pub datasets: Option<DatasetList>,

    /// Enable debug-level logging
    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    pub verbose: bool,
}

impl CheckArgs {
    /// Dataset kinds selected for this run
    pub fn dataset_kinds(&self) -> Vec<DatasetKind> {
        match &self.datasets {
            Some(list) => list.0.clone(),
            None => DatasetKind::ALL.to_vec(),
        }
    }
}

/// Comma-separated dataset list validated against the known dataset names
#[derive(Debug, Clone)]
pub struct DatasetList(pub Vec<DatasetKind>);

impl FromStr for DatasetList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut kinds = Vec::new();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let kind = name.parse::<DatasetKind>().map_err(|_| {
                Error::unknown_dataset(format!(
                    "{} (expected one of: {})",
                    name,
                    DATASET_NAMES.join(", ")
                ))
            })?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        if kinds.is_empty() {
            return Err(Error::configuration("dataset list cannot be empty"));
        }
        Ok(DatasetList(kinds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_list_parsing() {
        let list: DatasetList = "commercial,mammal".parse().unwrap();
        assert_eq!(list.0, vec![DatasetKind::Commercial, DatasetKind::Mammal]);
    }

    #[test]
    fn test_dataset_list_rejects_unknown() {
        assert!("commercial,hamster".parse::<DatasetList>().is_err());
    }

    #[test]
    fn test_dataset_list_dedups() {
        let list: DatasetList = "mammal, mammal".parse().unwrap();
        assert_eq!(list.0, vec![DatasetKind::Mammal]);
    }

    #[test]
    fn test_empty_dataset_list_rejected() {
        assert!("".parse::<DatasetList>().is_err());
        assert!(" , ".parse::<DatasetList>().is_err());
    }
}
