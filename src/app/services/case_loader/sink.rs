//! Case sink abstraction
//!
//! The loader never talks to storage directly: it drives a [`CaseSink`],
//! which durably stores typed case records and import audit records. A
//! sink must distinguish uniqueness violations from other storage failures
//! so the loader can take its one-record-at-a-time recovery path instead
//! of failing a whole batch.

use crate::app::models::{ImportRecord, StoredCase};

/// Result type for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Failures a case sink can report
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// An external id already exists in durable storage
    #[error("duplicate external_id: {external_id}")]
    UniqueViolation { external_id: String },

    /// Any other storage failure
    #[error("sink storage error: {message}")]
    Storage { message: String },
}

impl SinkError {
    /// Create a uniqueness-violation error
    pub fn unique_violation(external_id: impl Into<String>) -> Self {
        Self::UniqueViolation {
            external_id: external_id.into(),
        }
    }

    /// Create a generic storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether this error is a uniqueness conflict
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, SinkError::UniqueViolation { .. })
    }
}

/// Durable storage for validated case records and import audit records
///
/// Batch inserts are transactional: a batch either lands whole or, on a
/// uniqueness conflict, not at all — the loader then retries record by
/// record.
pub trait CaseSink {
    /// Insert a batch of cases; `UniqueViolation` if any external id
    /// already exists, leaving nothing inserted
    fn insert_batch(&mut self, cases: &[StoredCase]) -> SinkResult<()>;

    /// Insert a single case; `UniqueViolation` if its external id exists
    fn insert_case(&mut self, case: &StoredCase) -> SinkResult<()>;

    /// Whether an import with this content hash completed previously
    fn has_completed_import(&self, file_hash: &str) -> SinkResult<bool>;

    /// Persist a new import record, returning its id
    fn record_import(&mut self, import: &ImportRecord) -> SinkResult<u64>;

    /// Overwrite an import record with its final state
    fn finish_import(&mut self, import_id: u64, import: &ImportRecord) -> SinkResult<()>;
}
