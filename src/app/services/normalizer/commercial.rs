//! Normalization rules for commercial and backyard poultry flock outbreaks
//!
//! Source columns: `County`, `State`, `Outbreak Date`, `Flock Type`,
//! `Flock Size`. Outbreak dates use the literal `MM-DD-YYYY` export format.
//! Repeated reports of the same flock on the same day are one physical
//! outbreak: aggregation keeps one record and multiplies the flock size by
//! the report count.

use super::aggregate::AggregatedGroup;
use super::external_id::{date_key, generate_external_id};
use super::field_parsers::{
    get_optional_field, parse_date_strict, parse_optional_count, title_cased, ColumnMap,
};
use super::{DatasetKind, DraftRow, ParseStats};
use crate::app::models::{AnimalCategory, CaseRecord, CaseStatus, Severity};
use crate::constants::{COMMERCIAL_DATE_FORMAT, DEFAULT_COUNTRY};
use csv::StringRecord;

const COL_COUNTY: &str = "County";
const COL_STATE: &str = "State";
const COL_OUTBREAK_DATE: &str = "Outbreak Date";
const COL_FLOCK_TYPE: &str = "Flock Type";
const COL_FLOCK_SIZE: &str = "Flock Size";

/// Extract typed rows from the commercial flocks export
pub fn extract_rows(
    raw_rows: &[StringRecord],
    mapping: &ColumnMap,
    stats: &mut ParseStats,
) -> Vec<DraftRow> {
    raw_rows
        .iter()
        .map(|record| {
            let date_raw = get_optional_field(record, mapping, COL_OUTBREAK_DATE);
            let case_date =
                date_raw.and_then(|value| parse_date_strict(value, COMMERCIAL_DATE_FORMAT));
            if date_raw.is_some() && case_date.is_none() {
                stats.date_coercions += 1;
            }

            let size_raw = get_optional_field(record, mapping, COL_FLOCK_SIZE);
            let affected = size_raw.and_then(parse_optional_count);
            if size_raw.is_some() && affected.is_none() {
                stats.count_coercions += 1;
            }

            DraftRow {
                county: title_cased(get_optional_field(record, mapping, COL_COUNTY)),
                state_province: title_cased(get_optional_field(record, mapping, COL_STATE)),
                case_date,
                species: get_optional_field(record, mapping, COL_FLOCK_TYPE)
                    .map(|s| s.to_string()),
                affected,
                ..DraftRow::default()
            }
        })
        .collect()
}

/// Grouping key defining one unique outbreak event
///
/// Distinct flock sizes in the same county on the same day remain distinct
/// outbreaks; identical rows are repeat reports of one outbreak.
pub fn group_key(row: &DraftRow) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        row.county.as_deref().unwrap_or(""),
        row.state_province.as_deref().unwrap_or(""),
        date_key(row.case_date),
        row.species.as_deref().unwrap_or(""),
        row.affected.map(|n| n.to_string()).unwrap_or_default(),
    )
}

/// Build the canonical case record for one aggregated outbreak
pub fn finish(group: AggregatedGroup) -> CaseRecord {
    let AggregatedGroup { first, detections } = group;

    let per_report_size = first.affected;
    let total_affected = per_report_size.map(|size| size * detections as i64);

    let description = match (detections, per_report_size, total_affected) {
        (n, Some(size), Some(total)) if n > 1 => Some(format!(
            "Aggregated from {} detections of {} birds each ({} total)",
            n, size, total
        )),
        _ => None,
    };

    let external_id = generate_external_id(
        DatasetKind::Commercial.id_prefix(),
        &[
            first.county.as_deref().unwrap_or(""),
            first.state_province.as_deref().unwrap_or(""),
            &date_key(first.case_date),
            first.species.as_deref().unwrap_or(""),
            &total_affected.map(|n| n.to_string()).unwrap_or_default(),
        ],
    );

    CaseRecord {
        external_id,
        case_date: first.case_date,
        status: CaseStatus::Confirmed.as_str().to_string(),
        severity: Some(
            Severity::from_affected_count(total_affected)
                .as_str()
                .to_string(),
        ),
        animal_category: AnimalCategory::Poultry.as_str().to_string(),
        animal_species: first.species,
        animals_affected: total_affected,
        country: DEFAULT_COUNTRY.to_string(),
        state_province: first.state_province,
        county: first.county,
        data_source: DatasetKind::Commercial.data_source().to_string(),
        description,
        ..CaseRecord::default()
    }
}
