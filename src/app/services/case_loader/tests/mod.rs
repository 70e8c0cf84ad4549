//! Tests for the bulk loader and case sink

pub mod loader_tests;
pub mod sink_tests;

// Test helper functions and fixtures
use crate::app::models::CaseRecord;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a valid case record with a unique external id
pub fn make_record(index: usize) -> CaseRecord {
    let mut record = make_record_with_id(&format!("TEST_{:012x}", index));
    record.animals_affected = Some(index as i64 + 1);
    record
}

/// Build a valid case record with an explicit external id
pub fn make_record_with_id(external_id: &str) -> CaseRecord {
    CaseRecord {
        external_id: external_id.to_string(),
        case_date: NaiveDate::from_ymd_opt(2024, 3, 15),
        status: "confirmed".to_string(),
        severity: Some("medium".to_string()),
        animal_category: "poultry".to_string(),
        animal_species: Some("Turkey".to_string()),
        animals_affected: Some(500),
        country: "USA".to_string(),
        state_province: Some("Iowa".to_string()),
        county: Some("Polk".to_string()),
        data_source: "usda".to_string(),
        ..CaseRecord::default()
    }
}

/// Write a source file with the given content into a temp directory
pub fn write_source_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("failed to write test source file");
    path
}
