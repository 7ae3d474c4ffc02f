//! SDS Processing Service
//!
//! Reads every PDF safety data sheet of the input directory, extracts one
//! record per document and writes the reconciled dataset as CSV.

use anyhow::Result;
use sdsheet_models::SdsDataset;
use sdsheet_utils::{init_logging, load_existing, save_csv, AppConfig};
use std::path::Path;
use tracing::{error, info};

mod pdf_processor;
mod pipeline;

use pipeline::{collect_documents, BatchRunner};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load_validated().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    init_logging(&config.logging)?;
    info!(
        input_dir = %config.storage.input_dir,
        output_path = %config.storage.output_path,
        "Starting SDS processing"
    );

    let documents = collect_documents(Path::new(&config.storage.input_dir)).await?;

    let existing = match &config.storage.existing_sheet {
        Some(path) => load_existing(Path::new(path)),
        None => Ok(SdsDataset::new()),
    };

    let runner = BatchRunner::new(&config.processing);
    match runner
        .run(documents, existing, config.processing.options())
        .await
    {
        Ok(outcome) => {
            save_csv(&outcome.dataset, Path::new(&config.storage.output_path))?;
            info!(summary = %serde_json::to_string(&outcome.summary)?, "{}", outcome.summary.message());
            Ok(())
        }
        Err(e) => {
            // The output file is left untouched
            error!(error = %e, code = e.error_code(), "Batch failed");
            Err(e.into())
        }
    }
}
