//! Normalization rules for wild-bird HPAI detections
//!
//! Source columns: `State`, `County`, `Collection Date`, `Date Detected`,
//! `HPAI Strain`, `Bird Species`, `WOAH Classification`, `Sampling Method`,
//! `Submitting Agency`. Dates are free-form. Each source row is one sampled
//! bird; aggregation collapses rows sharing the detection key and records
//! the bird count as the affected magnitude. Strain, classification,
//! sampling method, and agency are not canonical schema fields and move
//! into the metadata bag.

use super::aggregate::AggregatedGroup;
use super::external_id::{date_key, generate_external_id};
use super::field_parsers::{
    get_optional_field, metadata_key, parse_date_flexible, title_cased, ColumnMap,
};
use super::{DatasetKind, DraftRow, ParseStats};
use crate::app::models::{AnimalCategory, CaseRecord, CaseStatus, Severity};
use crate::constants::DEFAULT_COUNTRY;
use csv::StringRecord;
use std::collections::BTreeMap;

const COL_STATE: &str = "State";
const COL_COUNTY: &str = "County";
const COL_COLLECTION_DATE: &str = "Collection Date";
const COL_DATE_DETECTED: &str = "Date Detected";
const COL_SPECIES: &str = "Bird Species";

/// Source columns preserved in the metadata bag rather than the schema
const METADATA_COLUMNS: &[&str] = &[
    "HPAI Strain",
    "WOAH Classification",
    "Sampling Method",
    "Submitting Agency",
];

const STRAIN_KEY: &str = "hpai_strain";

/// Extract typed rows from the wild-bird detections export
pub fn extract_rows(
    raw_rows: &[StringRecord],
    mapping: &ColumnMap,
    stats: &mut ParseStats,
) -> Vec<DraftRow> {
    raw_rows
        .iter()
        .map(|record| {
            let collection_raw = get_optional_field(record, mapping, COL_COLLECTION_DATE);
            let case_date = collection_raw.and_then(parse_date_flexible);
            if collection_raw.is_some() && case_date.is_none() {
                stats.date_coercions += 1;
            }

            let detected_raw = get_optional_field(record, mapping, COL_DATE_DETECTED);
            let report_date = detected_raw.and_then(parse_date_flexible);
            if detected_raw.is_some() && report_date.is_none() {
                stats.date_coercions += 1;
            }

            let mut metadata = BTreeMap::new();
            for column in METADATA_COLUMNS {
                if let Some(value) = get_optional_field(record, mapping, column) {
                    metadata.insert(metadata_key(column), value.to_string());
                }
            }

            DraftRow {
                county: title_cased(get_optional_field(record, mapping, COL_COUNTY)),
                state_province: title_cased(get_optional_field(record, mapping, COL_STATE)),
                case_date,
                report_date,
                species: title_cased(get_optional_field(record, mapping, COL_SPECIES)),
                affected: None,
                metadata,
            }
        })
        .collect()
}

/// Grouping key defining one unique detection event
pub fn group_key(row: &DraftRow) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        row.county.as_deref().unwrap_or(""),
        row.state_province.as_deref().unwrap_or(""),
        date_key(row.case_date),
        date_key(row.report_date),
        row.species.as_deref().unwrap_or(""),
        row.metadata.get(STRAIN_KEY).map(String::as_str).unwrap_or(""),
    )
}

/// Build the canonical case record for one aggregated detection event
pub fn finish(group: AggregatedGroup) -> CaseRecord {
    let AggregatedGroup { first, detections } = group;

    let description = if detections > 1 {
        Some(format!(
            "Aggregated from {} individual bird detections",
            detections
        ))
    } else {
        None
    };

    let external_id = generate_external_id(
        DatasetKind::WildBird.id_prefix(),
        &[
            first.county.as_deref().unwrap_or(""),
            first.state_province.as_deref().unwrap_or(""),
            &date_key(first.case_date),
            &date_key(first.report_date),
            first.species.as_deref().unwrap_or(""),
            first.metadata.get(STRAIN_KEY).map(String::as_str).unwrap_or(""),
        ],
    );

    CaseRecord {
        external_id,
        case_date: first.case_date,
        report_date: first.report_date,
        status: CaseStatus::Confirmed.as_str().to_string(),
        // Individual detections are low severity; cluster escalation is a
        // downstream concern
        severity: Some(Severity::Low.as_str().to_string()),
        animal_category: AnimalCategory::WildBird.as_str().to_string(),
        animal_species: first.species,
        animals_affected: Some(detections as i64),
        country: DEFAULT_COUNTRY.to_string(),
        state_province: first.state_province,
        county: first.county,
        data_source: DatasetKind::WildBird.data_source().to_string(),
        description,
        extra_metadata: first.metadata,
        ..CaseRecord::default()
    }
}
