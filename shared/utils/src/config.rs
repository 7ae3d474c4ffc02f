use config::{Config, ConfigError, Environment, File};
use sdsheet_models::{DuplicateCheckMode, ProcessingOptions, DEFAULT_SOURCE_OF_INFORMATION};
use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

use crate::error::SdsResult;
use crate::validation::validate_model;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    #[validate]
    pub logging: LoggingConfig,
    #[validate]
    pub processing: ProcessingConfig,
    #[validate]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    #[validate(length(min = 1, message = "Log level is required"))]
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProcessingConfig {
    pub merge_duplicates: bool,
    pub duplicate_check: DuplicateCheckMode,
    #[validate(range(min = 1, max = 3600, message = "Document timeout must be between 1 and 3600 seconds"))]
    pub document_timeout_seconds: u64,
    #[validate(range(min = 1, max = 256, message = "At least one concurrent document is required"))]
    pub max_concurrent_documents: usize,
    #[validate(range(min = 1, message = "Maximum document size must be positive"))]
    pub max_document_bytes: u64,
    #[validate(length(min = 1, max = 100, message = "Source of information is required"))]
    pub source_of_information: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StorageConfig {
    #[validate(length(min = 1, message = "Input directory is required"))]
    pub input_dir: String,
    pub existing_sheet: Option<String>,
    #[validate(length(min = 1, message = "Output path is required"))]
    pub output_path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            .add_source(File::with_name("config/local").required(false))
            // Environment variables with SDSHEET prefix, e.g. SDSHEET__PROCESSING__DUPLICATE_CHECK
            .add_source(Environment::with_prefix("SDSHEET").separator("__"));

        config.build()?.try_deserialize()
    }

    /// Loads and checks the configuration against its validation rules
    pub fn load_validated() -> SdsResult<Self> {
        let config = Self::load()?;
        validate_model(&config)?;
        Ok(config)
    }
}

impl ProcessingConfig {
    pub fn options(&self) -> ProcessingOptions {
        ProcessingOptions::new(self.merge_duplicates, self.duplicate_check)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            file_path: None,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            merge_duplicates: false,
            duplicate_check: DuplicateCheckMode::Description,
            document_timeout_seconds: 120,
            max_concurrent_documents: 4,
            max_document_bytes: 50 * 1024 * 1024, // 50MB
            source_of_information: DEFAULT_SOURCE_OF_INFORMATION.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            input_dir: "sds_uploads".to_string(),
            existing_sheet: None,
            output_path: "sds_extraction_results.csv".to_string(),
        }
    }
}
