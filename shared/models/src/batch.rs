use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::options::ProcessingOptions;
use crate::record::SdsField;

/// A document that produced no record, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDocument {
    pub file_name: String,
    pub reason: String,
}

impl SkippedDocument {
    pub fn new(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkippedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name, self.reason)
    }
}

/// Which rule produced a field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub field: SdsField,
    pub rule: &'static str,
}

/// Counts and options reported back to the caller after a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub total_files: usize,
    pub processed_files: usize,
    pub new_entries_added: usize,
    pub total_entries_in_output: usize,
    /// Rows of the existing sheet the batch was reconciled against
    pub baseline_rows: usize,
    /// Set when the existing sheet could not be loaded and an empty
    /// baseline was used instead
    pub baseline_fallback: Option<String>,
    pub skipped_files: Vec<String>,
    pub processing_options: ProcessingOptions,
    pub completed_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn message(&self) -> String {
        let mut message = format!(
            "Processed {} of {} files; added {} new entries ({} rows in output)",
            self.processed_files, self.total_files, self.new_entries_added, self.total_entries_in_output
        );
        if !self.skipped_files.is_empty() {
            message.push_str(&format!("; skipped {}", self.skipped_files.len()));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DuplicateCheckMode;

    #[test]
    fn test_skipped_document_display() {
        let skipped = SkippedDocument::new("scan.pdf", "no text extracted");
        assert_eq!(skipped.to_string(), "scan.pdf (no text extracted)");
    }

    #[test]
    fn test_summary_json_uses_camel_case() {
        let summary = BatchSummary {
            batch_id: Uuid::new_v4(),
            total_files: 3,
            processed_files: 2,
            new_entries_added: 1,
            total_entries_in_output: 5,
            baseline_rows: 4,
            baseline_fallback: None,
            skipped_files: vec!["scan.pdf (no text extracted)".to_string()],
            processing_options: ProcessingOptions::new(false, DuplicateCheckMode::Cas),
            completed_at: Utc::now(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalFiles"], 3);
        assert_eq!(json["newEntriesAdded"], 1);
        assert_eq!(json["totalEntriesInOutput"], 5);
        assert_eq!(json["processingOptions"]["duplicateCheck"], "cas");
        assert_eq!(
            summary.message(),
            "Processed 2 of 3 files; added 1 new entries (5 rows in output); skipped 1"
        );
    }
}
