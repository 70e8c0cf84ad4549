//! Normalization rules for mammal HPAI detections
//!
//! Source columns: `State`, `County`, `Date Collected`, `Date Detected`,
//! `HPAI Strain`, `Species`. Dates are free-form. Each source row is one
//! sampled animal; aggregation mirrors the wild-bird key and records the
//! detection count as the affected magnitude. The animal category is
//! inferred per row from the species name against a fixed domestic-mammal
//! vocabulary, and severity follows the category: domestic mammals carry
//! human-contact risk.

use super::aggregate::AggregatedGroup;
use super::external_id::{date_key, generate_external_id};
use super::field_parsers::{
    get_optional_field, parse_date_flexible, title_cased, ColumnMap,
};
use super::{DatasetKind, DraftRow, ParseStats};
use crate::app::models::{AnimalCategory, CaseRecord, CaseStatus, Severity};
use crate::constants::{DEFAULT_COUNTRY, DOMESTIC_MAMMAL_KEYWORDS};
use csv::StringRecord;
use std::collections::BTreeMap;

const COL_STATE: &str = "State";
const COL_COUNTY: &str = "County";
const COL_DATE_COLLECTED: &str = "Date Collected";
const COL_DATE_DETECTED: &str = "Date Detected";
const COL_STRAIN: &str = "HPAI Strain";
const COL_SPECIES: &str = "Species";

const STRAIN_KEY: &str = "hpai_strain";

/// Extract typed rows from the mammal detections export
pub fn extract_rows(
    raw_rows: &[StringRecord],
    mapping: &ColumnMap,
    stats: &mut ParseStats,
) -> Vec<DraftRow> {
    raw_rows
        .iter()
        .map(|record| {
            let collected_raw = get_optional_field(record, mapping, COL_DATE_COLLECTED);
            let case_date = collected_raw.and_then(parse_date_flexible);
            if collected_raw.is_some() && case_date.is_none() {
                stats.date_coercions += 1;
            }

            let detected_raw = get_optional_field(record, mapping, COL_DATE_DETECTED);
            let report_date = detected_raw.and_then(parse_date_flexible);
            if detected_raw.is_some() && report_date.is_none() {
                stats.date_coercions += 1;
            }

            let mut metadata = BTreeMap::new();
            if let Some(strain) = get_optional_field(record, mapping, COL_STRAIN) {
                metadata.insert(STRAIN_KEY.to_string(), strain.to_string());
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

/// Classify a mammal species as domestic or wild by keyword match
pub fn determine_animal_category(species: Option<&str>) -> AnimalCategory {
    let Some(species) = species else {
        return AnimalCategory::WildMammal;
    };

    let species_lower = species.to_lowercase();
    if DOMESTIC_MAMMAL_KEYWORDS
        .iter()
        .any(|keyword| species_lower.contains(keyword))
    {
        AnimalCategory::DomesticMammal
    } else {
        AnimalCategory::WildMammal
    }
}

/// Build the canonical case record for one aggregated detection event
pub fn finish(group: AggregatedGroup) -> CaseRecord {
    let AggregatedGroup { first, detections } = group;

    let category = determine_animal_category(first.species.as_deref());
    let severity = match category {
        // Human-contact risk
        AnimalCategory::DomesticMammal => Severity::High,
        _ => Severity::Medium,
    };

    let description = if detections > 1 {
        Some(format!(
            "Aggregated from {} individual detections",
            detections
        ))
    } else {
        None
    };

    let external_id = generate_external_id(
        DatasetKind::Mammal.id_prefix(),
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
        severity: Some(severity.as_str().to_string()),
        animal_category: category.as_str().to_string(),
        animal_species: first.species,
        animals_affected: Some(detections as i64),
        country: DEFAULT_COUNTRY.to_string(),
        state_province: first.state_province,
        county: first.county,
        data_source: DatasetKind::Mammal.data_source().to_string(),
        description,
        extra_metadata: first.metadata,
        ..CaseRecord::default()
    }
}
