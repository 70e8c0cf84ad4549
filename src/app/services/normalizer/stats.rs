//! Parsing statistics for dataset normalization runs

use serde::{Deserialize, Serialize};

/// Statistics for one dataset normalization run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data rows read from the source file
    pub total_rows: usize,

    /// Case records produced after aggregation
    pub records_normalized: usize,

    /// Rows collapsed into an existing record by aggregation
    pub rows_merged: usize,

    /// Rows whose date field failed to parse and was coerced to null
    pub date_coercions: usize,

    /// Rows whose magnitude field failed to parse and was coerced to null
    pub count_coercions: usize,

    /// Row-level read errors for debugging
    pub errors: Vec<String>,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any row-level errors were recorded
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Share of rows merged away by aggregation, as a percentage
    pub fn merged_percentage(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.rows_merged as f64 / self.total_rows as f64) * 100.0
        }
    }
}
