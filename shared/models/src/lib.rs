//! # Sdsheet Core Domain Models
//!
//! Domain types shared by the SDS extraction engine and the batch runner.
//!
//! ## Key Models
//!
//! - **SdsRecord**: one safety-data-sheet row with the fixed 18-field schema
//! - **SdsDataset**: an ordered set of records (the spreadsheet)
//! - **StaticHazard / Flammability**: categorical values rendered into records
//! - **ProcessingOptions / DuplicateCheckMode**: per-batch reconciliation policy
//! - **BatchSummary / SkippedDocument**: what the caller reports after a batch
//!
//! Absent values are `None` inside a record and are rendered as the `"NDA"`
//! sentinel only at the output boundary.

pub mod batch;
pub mod dataset;
pub mod hazard;
pub mod options;
pub mod record;


pub use batch::*;
pub use dataset::*;
pub use hazard::*;
pub use options::*;
pub use record::*;
