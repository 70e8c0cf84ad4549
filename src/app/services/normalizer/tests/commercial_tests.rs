//! Tests for commercial poultry normalization

use super::{normalize, COMMERCIAL_HEADERS};
use crate::app::services::normalizer::DatasetKind;
use chrono::NaiveDate;

#[test]
fn test_single_row_normalization() {
    let (records, _) = normalize(
        DatasetKind::Commercial,
        COMMERCIAL_HEADERS,
        &[&["Los Angeles", "CA", "03-15-2024", "Turkey", "500"]],
    );

    assert_eq!(records.len(), 1);
    let record = &records[0];

    assert_eq!(record.county.as_deref(), Some("Los Angeles"));
    // Title-casing does not expand abbreviations
    assert_eq!(record.state_province.as_deref(), Some("Ca"));
    assert_eq!(record.case_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    assert_eq!(record.animal_species.as_deref(), Some("Turkey"));
    assert_eq!(record.animals_affected, Some(500));
    assert_eq!(record.animal_category, "poultry");
    assert_eq!(record.severity.as_deref(), Some("medium"));
    assert_eq!(record.data_source, "usda");
    assert_eq!(record.status, "confirmed");
    assert_eq!(record.country, "USA");
    assert!(record.description.is_none());
}

#[test]
fn test_external_id_shape() {
    let (records, _) = normalize(
        DatasetKind::Commercial,
        COMMERCIAL_HEADERS,
        &[&["Los Angeles", "CA", "03-15-2024", "Turkey", "500"]],
    );

    let id = &records[0].external_id;
    assert!(id.starts_with("COMM_"));
    let digest = &id["COMM_".len()..];
    assert_eq!(digest.len(), 12);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_external_id_stable_across_runs() {
    let rows: &[&[&str]] = &[&["Weld", "Colorado", "11-02-2024", "Broiler", "12000"]];

    let (first_run, _) = normalize(DatasetKind::Commercial, COMMERCIAL_HEADERS, rows);
    let (second_run, _) = normalize(DatasetKind::Commercial, COMMERCIAL_HEADERS, rows);

    assert_eq!(first_run[0].external_id, second_run[0].external_id);
}

#[test]
fn test_aggregation_sums_affected() {
    let row: &[&str] = &["Polk", "Iowa", "04-01-2024", "Layer", "20"];
    let (records, stats) = normalize(
        DatasetKind::Commercial,
        COMMERCIAL_HEADERS,
        &[row, row, row],
    );

    assert_eq!(records.len(), 1);
    let record = &records[0];
    // Conservation: 3 reports of 20 birds each is one 60-bird outbreak
    assert_eq!(record.animals_affected, Some(60));
    assert_eq!(
        record.description.as_deref(),
        Some("Aggregated from 3 detections of 20 birds each (60 total)")
    );
    assert_eq!(stats.rows_merged, 2);
}

#[test]
fn test_distinct_flock_sizes_stay_distinct() {
    let (records, _) = normalize(
        DatasetKind::Commercial,
        COMMERCIAL_HEADERS,
        &[
            &["Polk", "Iowa", "04-01-2024", "Layer", "20"],
            &["Polk", "Iowa", "04-01-2024", "Layer", "35"],
        ],
    );

    // Different flock size on the same day in the same county is a
    // different farm, not a repeat report
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].external_id, records[1].external_id);
}

#[test]
fn test_severity_tiers() {
    let (records, _) = normalize(
        DatasetKind::Commercial,
        COMMERCIAL_HEADERS,
        &[
            &["A", "Iowa", "04-01-2024", "Backyard", "50"],
            &["B", "Iowa", "04-01-2024", "Layer", "5000"],
            &["C", "Iowa", "04-01-2024", "Layer", "40000"],
            &["D", "Iowa", "04-01-2024", "Layer", "2000000"],
        ],
    );

    let severities: Vec<_> = records
        .iter()
        .map(|r| r.severity.as_deref().unwrap())
        .collect();
    assert_eq!(severities, vec!["low", "medium", "high", "critical"]);
}

#[test]
fn test_malformed_date_coerced_to_null() {
    // ISO format does not match the strict MM-DD-YYYY export format
    let (records, stats) = normalize(
        DatasetKind::Commercial,
        COMMERCIAL_HEADERS,
        &[&["Polk", "Iowa", "2024-04-01", "Layer", "20"]],
    );

    assert_eq!(records.len(), 1);
    assert!(records[0].case_date.is_none());
    assert_eq!(stats.date_coercions, 1);
}

#[test]
fn test_non_numeric_flock_size_coerced_to_null() {
    let (records, stats) = normalize(
        DatasetKind::Commercial,
        COMMERCIAL_HEADERS,
        &[&["Polk", "Iowa", "04-01-2024", "Layer", "unknown"]],
    );

    assert_eq!(records.len(), 1);
    assert!(records[0].animals_affected.is_none());
    assert_eq!(stats.count_coercions, 1);
    // No magnitude means an individual-detection severity
    assert_eq!(records[0].severity.as_deref(), Some("low"));
}

#[test]
fn test_whitespace_trimmed_and_title_cased() {
    let (records, _) = normalize(
        DatasetKind::Commercial,
        COMMERCIAL_HEADERS,
        &[&["  weld  ", "  COLORADO ", "11-02-2024", "  Broiler ", "100"]],
    );

    assert_eq!(records[0].county.as_deref(), Some("Weld"));
    assert_eq!(records[0].state_province.as_deref(), Some("Colorado"));
    assert_eq!(records[0].animal_species.as_deref(), Some("Broiler"));
}
