//! SDS Extraction Engine
//!
//! Pattern-based field extraction from safety-data-sheet text, value
//! normalization, and reconciliation of extracted records with an existing
//! dataset.

pub mod batch;
pub mod extractor;
pub mod library;
pub mod normalizer;
pub mod reconciler;
pub mod rules;


pub use batch::{BatchOutcome, DocumentOutcome, SdsBatch, NO_RECORDS_MESSAGE};
pub use extractor::{ExtractedRecord, SdsExtractor};
pub use library::{FieldLibrary, DEFAULT_VAPOUR_TEMPERATURE};
pub use normalizer::{clean_text, normalize, normalize_numeric};
pub use reconciler::{merge_by_cas, MergePolicy, Reconciler, Reconciliation};
pub use rules::{Rule, RuleMatch, RuleSet, Transform};
