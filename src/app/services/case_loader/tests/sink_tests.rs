//! Tests for the in-memory case sink

use super::make_record_with_id;
use crate::app::models::{ImportRecord, ImportStatus, StoredCase};
use crate::app::services::case_loader::{CaseSink, MemoryCaseSink};

fn stored(external_id: &str) -> StoredCase {
    StoredCase::try_from(&make_record_with_id(external_id)).unwrap()
}

#[test]
fn test_batch_insert_and_lookup() {
    let mut sink = MemoryCaseSink::new();
    sink.insert_batch(&[stored("A"), stored("B")]).unwrap();

    assert_eq!(sink.case_count(), 2);
    assert!(sink.case("A").is_some());
    assert!(sink.case("C").is_none());
}

#[test]
fn test_batch_insert_is_all_or_nothing() {
    let mut sink = MemoryCaseSink::new();
    sink.insert_case(&stored("B")).unwrap();

    // The conflicting batch must leave storage untouched
    let err = sink
        .insert_batch(&[stored("A"), stored("B"), stored("C")])
        .unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(sink.case_count(), 1);
    assert!(sink.case("A").is_none());
}

#[test]
fn test_single_insert_conflict() {
    let mut sink = MemoryCaseSink::new();
    sink.insert_case(&stored("A")).unwrap();

    let err = sink.insert_case(&stored("A")).unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(sink.case_count(), 1);
}

#[test]
fn test_completed_import_lookup() {
    let mut sink = MemoryCaseSink::new();

    let mut import = ImportRecord::begin("usda", "flocks.csv", "hash-1", 10);
    let id = sink.record_import(&import).unwrap();

    // In-progress imports do not short-circuit anything
    assert!(!sink.has_completed_import("hash-1").unwrap());

    import.status = ImportStatus::Completed;
    sink.finish_import(id, &import).unwrap();
    assert!(sink.has_completed_import("hash-1").unwrap());
    assert!(!sink.has_completed_import("hash-2").unwrap());
}

#[test]
fn test_completed_with_errors_does_not_short_circuit() {
    let mut sink = MemoryCaseSink::new();

    let mut import = ImportRecord::begin("usda", "flocks.csv", "hash-1", 10);
    let id = sink.record_import(&import).unwrap();
    import.status = ImportStatus::CompletedWithErrors;
    sink.finish_import(id, &import).unwrap();

    // Only a clean completion marks the file as fully imported
    assert!(!sink.has_completed_import("hash-1").unwrap());
}

#[test]
fn test_finish_import_unknown_id() {
    let mut sink = MemoryCaseSink::new();
    let import = ImportRecord::begin("usda", "flocks.csv", "hash-1", 10);
    assert!(sink.finish_import(99, &import).is_err());
}
