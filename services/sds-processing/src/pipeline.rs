//! Concurrent batch runner
//!
//! Each document is read and extracted on a blocking worker, with bounded
//! parallelism and a wall-clock budget per document. Failures of single
//! documents become skip entries; the batch itself only fails when no
//! document produced a record.

use anyhow::{Context, Result};
use sdsheet_models::{ProcessingOptions, SdsDataset, SkippedDocument};
use sdsheet_utils::{
    validate_file_size, validate_file_type, BatchOutcome, DocumentOutcome, ExtractedRecord,
    ProcessingConfig, SdsBatch, SdsError, SdsExtractor, SdsResult,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

use crate::pdf_processor::{PdfProcessor, TextExtractor};

/// A document queued for processing
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl SourceDocument {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }
}

/// Reads every `*.pdf` file of `dir`, sorted by file name
pub async fn collect_documents(dir: &Path) -> Result<Vec<SourceDocument>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| validate_file_type(name, &["pdf"]).is_ok());

        if is_pdf && entry.file_type().await?.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        documents.push(SourceDocument::new(file_name, data));
    }

    info!(dir = %dir.display(), documents = documents.len(), "Collected documents");
    Ok(documents)
}

#[derive(Debug, Clone)]
pub struct BatchRunner<P = PdfProcessor> {
    processor: P,
    extractor: SdsExtractor,
    document_timeout: Duration,
    max_concurrent_documents: usize,
    max_document_bytes: u64,
}

impl BatchRunner {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self::with_processor(PdfProcessor::new(), config)
    }
}

impl<P: TextExtractor> BatchRunner<P> {
    pub fn with_processor(processor: P, config: &ProcessingConfig) -> Self {
        Self {
            processor,
            extractor: SdsExtractor::new()
                .with_source_of_information(config.source_of_information.clone()),
            document_timeout: Duration::from_secs(config.document_timeout_seconds),
            max_concurrent_documents: config.max_concurrent_documents.max(1),
            max_document_bytes: config.max_document_bytes,
        }
    }

    /// Wall-clock budget per document
    pub fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = timeout;
        self
    }

    /// Processes `documents` and reconciles the records with `existing`.
    pub async fn run(
        &self,
        documents: Vec<SourceDocument>,
        existing: SdsResult<SdsDataset>,
        options: ProcessingOptions,
    ) -> SdsResult<BatchOutcome> {
        info!(
            documents = documents.len(),
            max_concurrent = self.max_concurrent_documents,
            timeout_seconds = self.document_timeout.as_secs(),
            "Starting batch"
        );

        let mut batch = SdsBatch::new(self.extractor.clone());
        for outcome in self.process_all(documents).await {
            batch.push(outcome);
        }

        batch.finish(existing, options)
    }

    /// Outcomes in input order
    async fn process_all(&self, documents: Vec<SourceDocument>) -> Vec<DocumentOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_documents));
        let mut handles = Vec::with_capacity(documents.len());

        for document in documents {
            let file_name = document.file_name.clone();
            let semaphore = Arc::clone(&semaphore);
            let runner = self.clone();

            let handle = tokio::spawn(async move {
                let permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| SdsError::internal(e.to_string()))?;
                runner.process_document(document, permit).await
            });
            handles.push((file_name, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (file_name, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(extracted)) => DocumentOutcome::Extracted(extracted),
                Ok(Err(e)) => skipped(file_name, e.skip_reason()),
                Err(e) => skipped(file_name, format!("processing error: worker failed: {}", e)),
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// The permit moves into the blocking worker, so a timed-out document
    /// keeps its slot until the worker actually returns.
    async fn process_document(
        &self,
        document: SourceDocument,
        permit: OwnedSemaphorePermit,
    ) -> SdsResult<ExtractedRecord> {
        validate_file_size(document.data.len() as u64, self.max_document_bytes)?;

        let processor = self.processor.clone();
        let extractor = self.extractor.clone();
        let worker = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let text = processor.extract_text(&document.file_name, &document.data)?;
            Ok::<_, SdsError>(extractor.extract(&text.text, &document.file_name))
        });

        // A timed-out worker is detached and finishes on its own
        match tokio::time::timeout(self.document_timeout, worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(SdsError::internal(format!("worker panicked: {}", e))),
            Err(_) => Err(SdsError::timeout(self.document_timeout.as_secs())),
        }
    }
}

fn skipped(file_name: String, reason: String) -> DocumentOutcome {
    warn!(file = %file_name, reason = %reason, "Skipping document");
    DocumentOutcome::Skipped(SkippedDocument::new(file_name, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf_processor::tests::sample_pdf;
    use crate::pdf_processor::{PdfText, TextSource};
    use sdsheet_models::{DuplicateCheckMode, SdsField, SdsRecord};

    /// Treats the document bytes as its text; `slow*` documents stall
    #[derive(Debug, Clone)]
    struct PlainText {
        stall: Duration,
    }

    impl TextExtractor for PlainText {
        fn extract_text(&self, file_name: &str, data: &[u8]) -> SdsResult<PdfText> {
            if file_name.starts_with("slow") {
                std::thread::sleep(self.stall);
            }
            Ok(PdfText {
                text: String::from_utf8_lossy(data).into_owned(),
                source: TextSource::PdfExtract,
            })
        }
    }

    fn runner() -> BatchRunner {
        BatchRunner::new(&ProcessingConfig::default())
    }

    #[tokio::test]
    async fn test_batch_with_skips() {
        let documents = vec![
            SourceDocument::new("Ethanol.pdf", sample_pdf(&["CAS No.: 64-17-5", "Flash point: 13 C"])),
            SourceDocument::new("broken.pdf", b"not a pdf".to_vec()),
            SourceDocument::new("blank.pdf", sample_pdf(&[])),
        ];

        let outcome = runner()
            .run(documents, Ok(SdsDataset::new()), ProcessingOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.summary.total_files, 3);
        assert_eq!(outcome.summary.processed_files, 1);
        assert_eq!(
            outcome.summary.skipped_files,
            vec![
                "broken.pdf (no text extracted)".to_string(),
                "blank.pdf (no text extracted)".to_string(),
            ]
        );

        let record = &outcome.dataset.records()[0];
        assert_eq!(record.description(), Some("Ethanol"));
        assert_eq!(record.cas_number(), Some("64-17-5"));
        assert_eq!(record.get(SdsField::SourceOfInformation), Some("MSDS"));
    }

    #[tokio::test]
    async fn test_all_documents_unreadable_fails_the_batch() {
        let documents = vec![
            SourceDocument::new("a.pdf", b"garbage".to_vec()),
            SourceDocument::new("b.pdf", Vec::new()),
        ];

        let error = runner()
            .run(documents, Ok(SdsDataset::new()), ProcessingOptions::default())
            .await
            .unwrap_err();

        assert_eq!(error.error_code(), "BATCH_FAILURE");
    }

    #[tokio::test]
    async fn test_oversized_documents_are_skipped() {
        let config = ProcessingConfig {
            max_document_bytes: 16,
            ..ProcessingConfig::default()
        };
        let documents = vec![
            SourceDocument::new("big.pdf", sample_pdf(&["CAS No.: 64-17-5"])),
            SourceDocument::new("small.pdf", b"%PDF".to_vec()),
        ];

        let error = BatchRunner::new(&config)
            .run(documents, Ok(SdsDataset::new()), ProcessingOptions::default())
            .await
            .unwrap_err();
        assert_eq!(error.error_code(), "BATCH_FAILURE");
    }

    #[tokio::test]
    async fn test_existing_duplicates_are_filtered() {
        let existing = SdsDataset::from_records(vec![SdsRecord::new()
            .with(SdsField::Description, "Water")
            .with(SdsField::CasNumber, "7732-18-5")]);
        let documents = vec![
            SourceDocument::new("Ethanol.pdf", sample_pdf(&["CAS No.: 64-17-5"])),
            SourceDocument::new("Water.pdf", sample_pdf(&["CAS No.: 7732-18-5"])),
        ];

        let outcome = runner()
            .run(documents, Ok(existing), ProcessingOptions::new(false, DuplicateCheckMode::Cas))
            .await
            .unwrap();

        assert_eq!(outcome.summary.processed_files, 2);
        assert_eq!(outcome.summary.new_entries_added, 1);
        let names: Vec<&str> = outcome.dataset.iter().filter_map(|r| r.description()).collect();
        assert_eq!(names, vec!["Water", "Ethanol"]);
    }

    #[tokio::test]
    async fn test_timed_out_document_is_skipped() {
        let processor = PlainText {
            stall: Duration::from_millis(1500),
        };
        let runner = BatchRunner::with_processor(processor, &ProcessingConfig::default())
            .with_document_timeout(Duration::from_secs(1));
        let documents = vec![
            SourceDocument::new("Ethanol.pdf", b"CAS No.: 64-17-5".to_vec()),
            SourceDocument::new("slow.pdf", b"CAS No.: 7732-18-5".to_vec()),
            SourceDocument::new("Acetone.pdf", b"CAS No.: 67-64-1".to_vec()),
        ];

        let outcome = runner
            .run(documents, Ok(SdsDataset::new()), ProcessingOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.summary.total_files, 3);
        assert_eq!(outcome.summary.processed_files, 2);
        assert_eq!(
            outcome.summary.skipped_files,
            vec!["slow.pdf (timed out after 1s)".to_string()]
        );
        let names: Vec<&str> = outcome.dataset.iter().filter_map(|r| r.description()).collect();
        assert_eq!(names, vec!["Ethanol", "Acetone"]);
    }

    #[tokio::test]
    async fn test_collect_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"b").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"n").unwrap();
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let documents = collect_documents(dir.path()).await.unwrap();
        let names: Vec<&str> = documents.iter().map(|d| d.file_name.as_str()).collect();

        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
        assert_eq!(documents[0].data, b"a".to_vec());
    }
}
