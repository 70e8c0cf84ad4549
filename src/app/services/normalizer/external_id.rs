//! Deterministic external-id generation
//!
//! External ids are the deduplication identity for case records: a stable
//! digest over the fields that define uniqueness for a dataset, prefixed
//! with a dataset tag. Identical source rows produce the identical id on
//! every run.

use crate::constants::EXTERNAL_ID_HASH_LEN;
use chrono::NaiveDate;

/// Generate an external id from a dataset prefix and ordered key fields
///
/// The key fields are pipe-joined and digested; the first 12 hex characters
/// keep ids short while remaining collision-safe at surveillance volumes.
pub fn generate_external_id(prefix: &str, key_parts: &[&str]) -> String {
    let key = key_parts.join("|");
    let digest = md5::compute(key.as_bytes());
    let hex = format!("{:x}", digest);
    format!("{}_{}", prefix, &hex[..EXTERNAL_ID_HASH_LEN])
}

/// Render an optional date as its `YYYY-MM-DD` key form, empty when absent
pub fn date_key(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
