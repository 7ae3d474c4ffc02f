//! PDF Processor
//!
//! Extracts the text of a PDF document with `pdf-extract`, falling back to
//! page-by-page `lopdf` extraction when the first pass fails, panics or
//! yields only whitespace.

use anyhow::{anyhow, Context, Result};
use lopdf::Document;
use sdsheet_utils::{SdsError, SdsResult};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Which extractor produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    PdfExtract,
    Lopdf,
}

/// Text of a whole document
#[derive(Debug, Clone)]
pub struct PdfText {
    pub text: String,
    pub source: TextSource,
}

/// Turns the bytes of one document into its text
pub trait TextExtractor: Clone + Send + Sync + 'static {
    fn extract_text(&self, file_name: &str, data: &[u8]) -> SdsResult<PdfText>;
}

/// PDF processor
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfProcessor {
    /// Extract text from PDF bytes. Fails with `ExtractionEmpty` when
    /// neither extractor finds any text.
    fn extract_text(&self, file_name: &str, data: &[u8]) -> SdsResult<PdfText> {
        match extract_with_pdf_extract(data) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(file = %file_name, chars = text.len(), "Extracted text with pdf-extract");
                return Ok(PdfText {
                    text,
                    source: TextSource::PdfExtract,
                });
            }
            Ok(_) => debug!(file = %file_name, "pdf-extract returned no text, trying lopdf"),
            Err(e) => warn!(file = %file_name, error = %format!("{:#}", e), "pdf-extract failed, trying lopdf"),
        }

        match extract_with_lopdf(data) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(file = %file_name, chars = text.len(), "Extracted text with lopdf");
                Ok(PdfText {
                    text,
                    source: TextSource::Lopdf,
                })
            }
            Ok(_) => Err(SdsError::extraction_empty(file_name)),
            Err(e) => {
                warn!(file = %file_name, error = %format!("{:#}", e), "lopdf extraction failed");
                Err(SdsError::extraction_empty(file_name))
            }
        }
    }
}

fn extract_with_pdf_extract(data: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed fonts
    panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data)))
        .map_err(|_| anyhow!("pdf-extract panicked"))?
        .context("Failed to extract text from PDF")
}

fn extract_with_lopdf(data: &[u8]) -> Result<String> {
    let mut document = Document::load_mem(data).context("Failed to load PDF")?;
    document.decompress();

    let mut page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Ok(String::new());
    }
    page_numbers.sort_unstable();

    document
        .extract_text(&page_numbers)
        .context("Failed to extract text from PDF pages")
}
