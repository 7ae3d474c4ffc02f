//! Batch assembly
//!
//! Collects the outcome of every document in a batch and reconciles the
//! extracted records against the existing dataset.

use chrono::Utc;
use sdsheet_models::{BatchSummary, ProcessingOptions, SdsDataset, SkippedDocument};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::extractor::{ExtractedRecord, SdsExtractor};
use super::reconciler::Reconciler;
use crate::error::{SdsError, SdsResult};

pub const NO_RECORDS_MESSAGE: &str =
    "No valid SDS data could be extracted from any PDF files. Please check if the PDFs contain readable text.";

/// What happened to one document of a batch
#[derive(Debug, Clone)]
pub enum DocumentOutcome {
    Extracted(ExtractedRecord),
    Skipped(SkippedDocument),
}

/// Result of a finished batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub dataset: SdsDataset,
    pub extractions: Vec<ExtractedRecord>,
    pub summary: BatchSummary,
}

/// Accumulates document outcomes in input order
#[derive(Debug, Default)]
pub struct SdsBatch {
    extractor: SdsExtractor,
    outcomes: Vec<DocumentOutcome>,
}

impl SdsBatch {
    pub fn new(extractor: SdsExtractor) -> Self {
        Self {
            extractor,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: DocumentOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn skip(&mut self, file_name: impl Into<String>, reason: impl Into<String>) {
        let skipped = SkippedDocument::new(file_name, reason);
        warn!(file = %skipped.file_name, reason = %skipped.reason, "Skipping document");
        self.push(DocumentOutcome::Skipped(skipped));
    }

    /// Extracts a record from already extracted document text. Blank text
    /// becomes a skip entry.
    pub fn push_text(&mut self, file_name: &str, text: &str) {
        if text.trim().is_empty() {
            self.skip(file_name, SdsError::extraction_empty(file_name).skip_reason());
            return;
        }

        let extracted = self.extractor.extract(text, file_name);
        self.push(DocumentOutcome::Extracted(extracted));
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Reconciles the batch with the existing dataset.
    ///
    /// Fails with [`SdsError::BatchFailure`] when no document produced a
    /// record. An existing dataset that failed to load is replaced by an
    /// empty one and the reason is kept in the summary.
    pub fn finish(
        self,
        existing: SdsResult<SdsDataset>,
        options: ProcessingOptions,
    ) -> SdsResult<BatchOutcome> {
        let total_files = self.outcomes.len();
        let mut extractions = Vec::new();
        let mut skipped = Vec::new();

        for outcome in self.outcomes {
            match outcome {
                DocumentOutcome::Extracted(extracted) => extractions.push(extracted),
                DocumentOutcome::Skipped(skip) => skipped.push(skip.to_string()),
            }
        }

        if extractions.is_empty() {
            error!(total_files = total_files, skipped = skipped.len(), "No records extracted");
            return Err(SdsError::batch_failure(NO_RECORDS_MESSAGE));
        }

        let (baseline, baseline_fallback) = match existing {
            Ok(dataset) => (dataset, None),
            Err(e) => {
                warn!(error = %e, "Existing dataset unusable, reconciling against an empty one");
                (SdsDataset::new(), Some(e.to_string()))
            }
        };
        let baseline_rows = baseline.len();

        let records = extractions.iter().map(|e| e.record.clone()).collect();
        let reconciliation = Reconciler::from(options).reconcile(records, baseline);

        let summary = BatchSummary {
            batch_id: Uuid::new_v4(),
            total_files,
            processed_files: extractions.len(),
            new_entries_added: reconciliation.added,
            total_entries_in_output: reconciliation.dataset.len(),
            baseline_rows,
            baseline_fallback,
            skipped_files: skipped,
            processing_options: options,
            completed_at: Utc::now(),
        };

        info!(batch_id = %summary.batch_id, "{}", summary.message());

        Ok(BatchOutcome {
            dataset: reconciliation.dataset,
            extractions,
            summary,
        })
    }
}
