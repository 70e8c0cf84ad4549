//! Run-log writer for ingestion audits
//!
//! Writes one JSON document per ingestion run to the processed-data area,
//! named `{dataset}-log_{timestamp}.json`. The log is the durable audit
//! trail independent of the case sink.

use crate::app::models::audit::IngestLog;
use crate::{Error, Result};
use chrono::Utc;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Derive the run-log dataset name from the source filename
///
/// Falls back to the lowercased source tag for unrecognized filenames.
pub fn dataset_name_for(source_file: &Path, source: &str) -> String {
    let filename = source_file
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if filename.contains("commercial") || filename.contains("backyard") {
        "commercial".to_string()
    } else if filename.contains("wild") && filename.contains("bird") {
        "wild_bird".to_string()
    } else if filename.contains("mammal") {
        "mammal".to_string()
    } else {
        source.to_lowercase()
    }
}

/// Write the run log for one ingestion, returning its path
pub fn write_run_log(processed_dir: &Path, dataset: &str, log: &IngestLog) -> Result<PathBuf> {
    std::fs::create_dir_all(processed_dir)
        .map_err(|e| Error::io("failed to create processed data directory", e))?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let log_path = processed_dir.join(format!("{}-log_{}.json", dataset, timestamp));

    let file = File::create(&log_path)
        .map_err(|e| Error::io(format!("failed to create run log {}", log_path.display()), e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), log)?;

    info!("Run log written to {}", log_path.display());
    Ok(log_path)
}
