use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SdsError {
    #[error("No text could be extracted from {document}")]
    ExtractionEmpty { document: String },

    #[error("Existing dataset could not be loaded: {message}")]
    MalformedDataset { message: String },

    #[error("Batch failed: {message}")]
    BatchFailure { message: String },

    #[error("Timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SdsError {
    pub fn extraction_empty(document: impl Into<String>) -> Self {
        Self::ExtractionEmpty {
            document: document.into(),
        }
    }

    pub fn malformed_dataset(message: impl Into<String>) -> Self {
        Self::MalformedDataset {
            message: message.into(),
        }
    }

    pub fn batch_failure(message: impl Into<String>) -> Self {
        Self::BatchFailure {
            message: message.into(),
        }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ExtractionEmpty { .. } => "EXTRACTION_EMPTY",
            Self::MalformedDataset { .. } => "MALFORMED_DATASET",
            Self::BatchFailure { .. } => "BATCH_FAILURE",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Errors that end a whole batch rather than a single document
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::BatchFailure { .. } | Self::Configuration { .. })
    }

    /// Short reason used when a document is skipped
    pub fn skip_reason(&self) -> String {
        match self {
            Self::ExtractionEmpty { .. } => "no text extracted".to_string(),
            Self::Timeout { seconds } => format!("timed out after {}s", seconds),
            other => format!("processing error: {}", other),
        }
    }
}

pub type SdsResult<T> = Result<T, SdsError>;

impl From<std::io::Error> for SdsError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<csv::Error> for SdsError {
    fn from(error: csv::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for SdsError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<config::ConfigError> for SdsError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
