//! Tests for the dataset normalization pipeline

pub mod commercial_tests;
pub mod external_id_tests;

// Test helper functions and fixtures
use crate::app::models::CaseRecord;
use crate::app::services::normalizer::field_parsers::ColumnMap;
use crate::app::services::normalizer::{DatasetKind, Normalizer, ParseStats};
use csv::StringRecord;

/// Build raw records and a column map from literal headers and rows
pub fn records_from(headers: &[&str], rows: &[&[&str]]) -> (Vec<StringRecord>, ColumnMap) {
    let header_record = StringRecord::from(headers.to_vec());
    let mapping = ColumnMap::from_headers(&header_record);
    let records = rows
        .iter()
        .map(|row| StringRecord::from(row.to_vec()))
        .collect();
    (records, mapping)
}

/// Run the full in-memory normalization pipeline for a dataset
pub fn normalize(
    kind: DatasetKind,
    headers: &[&str],
    rows: &[&[&str]],
) -> (Vec<CaseRecord>, ParseStats) {
    let (records, mapping) = records_from(headers, rows);
    let mut stats = ParseStats::new();
    stats.total_rows = records.len();
    let normalizer = Normalizer::new(kind);
    let out = normalizer.normalize_rows(&records, &mapping, &mut stats);
    stats.records_normalized = out.len();
    (out, stats)
}

/// Header set for the commercial flocks dataset
pub const COMMERCIAL_HEADERS: &[&str] =
    &["County", "State", "Outbreak Date", "Flock Type", "Flock Size"];

/// Header set for the wild-bird detections dataset
pub const WILD_BIRD_HEADERS: &[&str] = &[
    "State",
    "County",
    "Collection Date",
    "Date Detected",
    "HPAI Strain",
    "Bird Species",
    "WOAH Classification",
    "Sampling Method",
    "Submitting Agency",
];

/// Header set for the mammal detections dataset
pub const MAMMAL_HEADERS: &[&str] = &[
    "State",
    "County",
    "Date Collected",
    "Date Detected",
    "HPAI Strain",
    "Species",
];
