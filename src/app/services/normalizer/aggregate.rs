//! Duplicate-row aggregation for normalized dataset rows
//!
//! Surveillance exports repeat one physical event across several rows. This
//! module collapses rows sharing a dataset-specific grouping key into one
//! group carrying the first row's fields and the detection count. Grouping
//! runs before column mapping so each dataset can key on its own source
//! fields.

use super::DraftRow;
use std::collections::HashMap;
use tracing::info;

/// One aggregated event: the first row of its group plus how many source
/// rows described it
#[derive(Debug, Clone)]
pub struct AggregatedGroup {
    pub first: DraftRow,
    pub detections: usize,
}

/// Collapse rows into groups by key, preserving first-occurrence order
///
/// Group order and "first row of a group" are both stable by original row
/// order, so re-running over the same input reproduces identical output.
pub fn aggregate_rows<F>(rows: Vec<DraftRow>, key_fn: F) -> Vec<AggregatedGroup>
where
    F: Fn(&DraftRow) -> String,
{
    let original_count = rows.len();
    let mut groups: Vec<AggregatedGroup> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = key_fn(&row);
        match index_by_key.get(&key) {
            Some(&index) => {
                groups[index].detections += 1;
            }
            None => {
                index_by_key.insert(key, groups.len());
                groups.push(AggregatedGroup {
                    first: row,
                    detections: 1,
                });
            }
        }
    }

    if groups.len() < original_count {
        info!(
            "Aggregated {} detection rows into {} unique records",
            original_count,
            groups.len()
        );
    }

    groups
}

/// Count how many rows aggregation merged away
pub fn merged_row_count(groups: &[AggregatedGroup]) -> usize {
    groups
        .iter()
        .map(|g| g.detections.saturating_sub(1))
        .sum()
}
