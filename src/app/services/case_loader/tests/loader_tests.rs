//! Tests for bulk loading, dedup, idempotency, and audit records

use super::{make_record, make_record_with_id, write_source_file};
use crate::app::models::audit::RunMetadata;
use crate::app::models::ImportStatus;
use crate::app::services::case_loader::{BulkLoader, LoaderOptions, MemoryCaseSink};
use tempfile::TempDir;

fn loader_options() -> LoaderOptions {
    LoaderOptions {
        batch_size: 1000,
        processed_dir: std::env::temp_dir(),
        write_run_log: false,
    }
}

#[test]
fn test_simple_load() {
    let dir = TempDir::new().unwrap();
    let source = write_source_file(&dir, "flocks.csv", "content-a");
    let records: Vec<_> = (0..5).map(make_record).collect();

    let mut sink = MemoryCaseSink::new();
    let mut loader = BulkLoader::new(&mut sink, loader_options());
    let outcome = loader
        .load(&records, "usda", &source, RunMetadata::default())
        .unwrap();

    assert_eq!(outcome.successful, 5);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.duplicates, 0);
    assert!(!outcome.skipped_duplicate_file);
    assert_eq!(sink.case_count(), 5);
}

#[test]
fn test_within_batch_dedup() {
    let dir = TempDir::new().unwrap();
    let source = write_source_file(&dir, "flocks.csv", "content-b");

    // 1000 records where 10 share one external id
    let mut records: Vec<_> = (0..990).map(make_record).collect();
    for _ in 0..10 {
        records.push(make_record_with_id("TEST_duplicated0"));
    }

    let mut sink = MemoryCaseSink::new();
    let mut loader = BulkLoader::new(&mut sink, loader_options());
    let outcome = loader
        .load(&records, "usda", &source, RunMetadata::default())
        .unwrap();

    // Exactly one of the shared-id records is inserted; nine are duplicates
    assert_eq!(outcome.successful, 991);
    assert_eq!(outcome.duplicates, 9);
    assert_eq!(outcome.failed, 0);
    assert!(sink.case("TEST_duplicated0").is_some());
}

#[test]
fn test_idempotent_file_reingestion() {
    let dir = TempDir::new().unwrap();
    let source = write_source_file(&dir, "flocks.csv", "content-c");
    let records: Vec<_> = (0..10).map(make_record).collect();

    let mut sink = MemoryCaseSink::new();

    let first = BulkLoader::new(&mut sink, loader_options())
        .load(&records, "usda", &source, RunMetadata::default())
        .unwrap();
    assert_eq!(first.successful, 10);

    // Byte-identical file: the whole run short-circuits on the content hash
    let second = BulkLoader::new(&mut sink, loader_options())
        .load(&records, "usda", &source, RunMetadata::default())
        .unwrap();
    assert_eq!(second.successful, 0);
    assert_eq!(second.failed, 0);
    assert_eq!(second.duplicates, 10);
    assert!(second.skipped_duplicate_file);

    // No second import record, no double inserts
    assert_eq!(sink.imports().len(), 1);
    assert_eq!(sink.case_count(), 10);
}

#[test]
fn test_cross_batch_duplicates_via_fallback() {
    let dir = TempDir::new().unwrap();
    let first_file = write_source_file(&dir, "flocks-v1.csv", "content-d1");
    let second_file = write_source_file(&dir, "flocks-v2.csv", "content-d2");

    let mut sink = MemoryCaseSink::new();

    let first_batch: Vec<_> = (0..3).map(make_record).collect();
    BulkLoader::new(&mut sink, loader_options())
        .load(&first_batch, "usda", &first_file, RunMetadata::default())
        .unwrap();

    // Updated export: two previously seen rows plus two new ones
    let second_batch = vec![
        make_record(0),
        make_record(1),
        make_record(100),
        make_record(101),
    ];
    let outcome = BulkLoader::new(&mut sink, loader_options())
        .load(&second_batch, "usda", &second_file, RunMetadata::default())
        .unwrap();

    // Only the new external ids land; the rest are duplicates, not errors
    assert_eq!(outcome.successful, 2);
    assert_eq!(outcome.duplicates, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(sink.case_count(), 5);
}

#[test]
fn test_construction_failure_counts_as_failed() {
    let dir = TempDir::new().unwrap();
    let source = write_source_file(&dir, "flocks.csv", "content-e");

    let mut bad = make_record(1);
    bad.animal_category = "unicorn".to_string();
    let records = vec![make_record(0), bad];

    let mut sink = MemoryCaseSink::new();
    let outcome = BulkLoader::new(&mut sink, loader_options())
        .load(&records, "usda", &source, RunMetadata::default())
        .unwrap();

    assert_eq!(outcome.successful, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.duplicates, 0);

    let import = &sink.imports()[0];
    assert_eq!(import.status, ImportStatus::CompletedWithErrors);
    let error_log = import.error_log.as_deref().unwrap();
    assert!(error_log.contains("TEST_000000000001"));
}

#[test]
fn test_import_record_accounting() {
    let dir = TempDir::new().unwrap();
    let source = write_source_file(&dir, "flocks.csv", "content-f");

    let mut records: Vec<_> = (0..8).map(make_record).collect();
    records.push(make_record(0)); // within-batch duplicate
    let mut bad = make_record(50);
    bad.case_date = None;
    records.push(bad); // construction failure

    let mut sink = MemoryCaseSink::new();
    let outcome = BulkLoader::new(&mut sink, loader_options())
        .load(&records, "usda", &source, RunMetadata::default())
        .unwrap();

    assert_eq!(outcome.successful, 8);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(outcome.failed, 1);

    let import = &sink.imports()[0];
    assert_eq!(import.total_rows, 10);
    assert!(import.accounts_for_all_rows());
    assert!(import.completed_at.is_some());
    assert!(import.duration_seconds.is_some());
}

#[test]
fn test_small_batches_cross_batch_dedup() {
    let dir = TempDir::new().unwrap();
    let source = write_source_file(&dir, "flocks.csv", "content-g");

    // Batch size 2 forces the duplicate pair into separate batches, so it
    // is found by the per-record fallback rather than the within-batch scan
    let records = vec![
        make_record(0),
        make_record(1),
        make_record(0),
        make_record(2),
    ];

    let mut sink = MemoryCaseSink::new();
    let options = LoaderOptions {
        batch_size: 2,
        ..loader_options()
    };
    let outcome = BulkLoader::new(&mut sink, options)
        .load(&records, "usda", &source, RunMetadata::default())
        .unwrap();

    assert_eq!(outcome.successful, 3);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(sink.case_count(), 3);
}

#[test]
fn test_run_log_written() {
    let dir = TempDir::new().unwrap();
    let processed = TempDir::new().unwrap();
    let source = write_source_file(&dir, "commercial-backyard-flocks.csv", "content-h");
    let records: Vec<_> = (0..3).map(make_record).collect();

    let mut sink = MemoryCaseSink::new();
    let options = LoaderOptions {
        batch_size: 1000,
        processed_dir: processed.path().to_path_buf(),
        write_run_log: true,
    };
    let outcome = BulkLoader::new(&mut sink, options)
        .load(&records, "usda", &source, RunMetadata::default())
        .unwrap();

    let log_path = outcome.log_path.unwrap();
    assert!(log_path.exists());
    let name = log_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("commercial-log_"));
    assert!(name.ends_with(".json"));

    let content = std::fs::read_to_string(&log_path).unwrap();
    let log: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(log["dataset"], "commercial");
    assert_eq!(log["import"]["successful"], 3);
    assert_eq!(log["import"]["total_records"], 3);
}

#[test]
fn test_missing_source_file_is_fatal() {
    let records: Vec<_> = (0..2).map(make_record).collect();

    let mut sink = MemoryCaseSink::new();
    let result = BulkLoader::new(&mut sink, loader_options()).load(
        &records,
        "usda",
        std::path::Path::new("/nonexistent/flocks.csv"),
        RunMetadata::default(),
    );

    assert!(result.is_err());
    assert_eq!(sink.imports().len(), 0);
}
