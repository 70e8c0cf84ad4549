//! In-memory case sink
//!
//! Keyed-map implementation of [`CaseSink`] backing the CLI commands and
//! the test suite. Batch inserts are all-or-nothing, matching the
//! transactional bulk-insert semantics of a database-backed sink.

use super::sink::{CaseSink, SinkError, SinkResult};
use crate::app::models::{ImportRecord, ImportStatus, StoredCase};
use std::collections::HashMap;

/// Case sink holding everything in process memory
#[derive(Debug, Default)]
pub struct MemoryCaseSink {
    cases: HashMap<String, StoredCase>,
    imports: Vec<ImportRecord>,
}

impl MemoryCaseSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cases
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Look up a stored case by external id
    pub fn case(&self, external_id: &str) -> Option<&StoredCase> {
        self.cases.get(external_id)
    }

    /// Iterate over all stored cases, in no particular order
    pub fn cases(&self) -> impl Iterator<Item = &StoredCase> {
        self.cases.values()
    }

    /// All import records, in creation order
    pub fn imports(&self) -> &[ImportRecord] {
        &self.imports
    }
}

impl CaseSink for MemoryCaseSink {
    fn insert_batch(&mut self, cases: &[StoredCase]) -> SinkResult<()> {
        // Conflict check first so a rejected batch leaves storage untouched
        for case in cases {
            if self.cases.contains_key(&case.external_id) {
                return Err(SinkError::unique_violation(case.external_id.clone()));
            }
        }

        for case in cases {
            self.cases.insert(case.external_id.clone(), case.clone());
        }
        Ok(())
    }

    fn insert_case(&mut self, case: &StoredCase) -> SinkResult<()> {
        if self.cases.contains_key(&case.external_id) {
            return Err(SinkError::unique_violation(case.external_id.clone()));
        }
        self.cases.insert(case.external_id.clone(), case.clone());
        Ok(())
    }

    fn has_completed_import(&self, file_hash: &str) -> SinkResult<bool> {
        Ok(self.imports.iter().any(|import| {
            import.file_hash == file_hash && import.status == ImportStatus::Completed
        }))
    }

    fn record_import(&mut self, import: &ImportRecord) -> SinkResult<u64> {
        self.imports.push(import.clone());
        Ok((self.imports.len() - 1) as u64)
    }

    fn finish_import(&mut self, import_id: u64, import: &ImportRecord) -> SinkResult<()> {
        let slot = self
            .imports
            .get_mut(import_id as usize)
            .ok_or_else(|| SinkError::storage(format!("no import record with id {}", import_id)))?;
        *slot = import.clone();
        Ok(())
    }
}
