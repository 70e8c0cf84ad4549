//! Tests for external-id generation

use crate::app::services::normalizer::external_id::{date_key, generate_external_id};
use chrono::NaiveDate;

#[test]
fn test_id_shape() {
    let id = generate_external_id("COMM", &["Weld", "Colorado", "2024-03-15", "Turkey", "500"]);

    assert!(id.starts_with("COMM_"));
    let digest = &id["COMM_".len()..];
    assert_eq!(digest.len(), 12);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_id_is_deterministic() {
    let parts = ["Weld", "Colorado", "2024-03-15", "Turkey", "500"];
    assert_eq!(
        generate_external_id("COMM", &parts),
        generate_external_id("COMM", &parts)
    );
}

#[test]
fn test_different_keys_differ() {
    let a = generate_external_id("COMM", &["Weld", "Colorado", "2024-03-15", "Turkey", "500"]);
    let b = generate_external_id("COMM", &["Weld", "Colorado", "2024-03-15", "Turkey", "600"]);
    assert_ne!(a, b);
}

#[test]
fn test_prefix_distinguishes_datasets() {
    let parts = ["Weld", "Colorado", "2024-03-15", "", "Mallard", ""];
    let wild = generate_external_id("WILD", &parts);
    let mamm = generate_external_id("MAMM", &parts);

    assert!(wild.starts_with("WILD_"));
    assert!(mamm.starts_with("MAMM_"));
    // Same digest, different tags
    assert_eq!(wild["WILD_".len()..], mamm["MAMM_".len()..]);
}

#[test]
fn test_date_key_rendering() {
    assert_eq!(date_key(NaiveDate::from_ymd_opt(2024, 3, 5)), "2024-03-05");
    assert_eq!(date_key(None), "");
}
