//! Batch workflow tests
//!
//! Existing sheet on disk, extraction of a batch, reconciliation and the
//! written CSV read back in.

use sdsheet_models::{DuplicateCheckMode, ProcessingOptions, SdsField, NO_DATA};
use sdsheet_utils::{load_existing, save_csv, SdsBatch, SdsExtractor};

const EXISTING_CSV: &str = "\
Description,CAS Number,Density (g/cc),Source of Information
Water,7732-18-5,1.0,MSDS
";

#[test]
fn test_batch_against_existing_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let existing_path = dir.path().join("existing.csv");
    std::fs::write(&existing_path, EXISTING_CSV).unwrap();

    let mut batch = SdsBatch::new(SdsExtractor::new());
    batch.push_text("Ethanol.pdf", "CAS No.: 64-17-5\nDensity: 0.789 g/cm3");
    batch.push_text("Ethanol-en.pdf", "CAS-No.: 64-17-5\nFlash point: 13 °C");
    batch.push_text("Water.pdf", "CAS No.: 7732-18-5");
    batch.push_text("scan.pdf", "   ");

    let outcome = batch
        .finish(
            load_existing(&existing_path),
            ProcessingOptions::new(true, DuplicateCheckMode::Cas),
        )
        .unwrap();

    assert_eq!(outcome.summary.total_files, 4);
    assert_eq!(outcome.summary.processed_files, 3);
    assert_eq!(outcome.summary.new_entries_added, 1);
    assert_eq!(outcome.summary.total_entries_in_output, 2);
    assert_eq!(outcome.summary.skipped_files, vec!["scan.pdf (no text extracted)".to_string()]);

    let output_path = dir.path().join("results.csv");
    save_csv(&outcome.dataset, &output_path).unwrap();
    let written = load_existing(&output_path).unwrap();

    assert_eq!(written, outcome.dataset);
    let ethanol = &written.records()[1];
    assert_eq!(ethanol.description(), Some("Ethanol"));
    assert_eq!(ethanol.get(SdsField::Density), Some("0.789"));
    assert_eq!(ethanol.get(SdsField::FlashPoint), Some("13"));
    assert_eq!(ethanol.value_or_sentinel(SdsField::BoilingPoint), NO_DATA);
}

#[test]
fn test_unreadable_existing_sheet_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let existing_path = dir.path().join("existing.csv");
    std::fs::write(&existing_path, "Name,Price\nWater,1\n").unwrap();

    let mut batch = SdsBatch::new(SdsExtractor::new());
    batch.push_text("Water.pdf", "CAS No.: 7732-18-5");

    let outcome = batch
        .finish(load_existing(&existing_path), ProcessingOptions::default())
        .unwrap();

    assert_eq!(outcome.summary.baseline_rows, 0);
    assert!(outcome.summary.baseline_fallback.is_some());
    assert_eq!(outcome.dataset.len(), 1);
}
