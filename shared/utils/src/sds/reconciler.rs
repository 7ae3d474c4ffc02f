//! Record Reconciler
//!
//! Merges same-batch records that share a CAS number, filters the batch
//! against an existing dataset and appends the survivors.

use std::collections::{HashMap, HashSet};

use sdsheet_models::{DuplicateCheckMode, ProcessingOptions, SdsDataset, SdsRecord};
use tracing::debug;

/// Whether records of one batch sharing a CAS number are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    #[default]
    KeepAll,
    MergeByCas,
}

impl From<bool> for MergePolicy {
    fn from(merge_duplicates: bool) -> Self {
        if merge_duplicates {
            Self::MergeByCas
        } else {
            Self::KeepAll
        }
    }
}

/// Reconciled dataset and the number of new records appended to it
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub dataset: SdsDataset,
    pub added: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    merge_policy: MergePolicy,
    duplicate_check: DuplicateCheckMode,
}

impl From<ProcessingOptions> for Reconciler {
    fn from(options: ProcessingOptions) -> Self {
        Self::new(options.merge_duplicates.into(), options.duplicate_check)
    }
}

impl Reconciler {
    pub fn new(merge_policy: MergePolicy, duplicate_check: DuplicateCheckMode) -> Self {
        Self {
            merge_policy,
            duplicate_check,
        }
    }

    /// Existing records first, then the new records that are not duplicates
    /// of them, in their original relative order.
    pub fn reconcile(&self, new_records: Vec<SdsRecord>, existing: SdsDataset) -> Reconciliation {
        let incoming = new_records.len();
        let candidates = match self.merge_policy {
            MergePolicy::KeepAll => new_records,
            MergePolicy::MergeByCas => merge_by_cas(new_records),
        };

        let survivors: Vec<SdsRecord> = if existing.is_empty() {
            candidates
        } else {
            let index = ExistingIndex::build(&existing);
            candidates
                .into_iter()
                .filter(|record| !index.is_duplicate(record, self.duplicate_check))
                .collect()
        };

        let added = survivors.len();
        debug!(
            incoming = incoming,
            added = added,
            existing = existing.len(),
            duplicate_check = %self.duplicate_check,
            "Reconciled batch"
        );

        let mut dataset = existing;
        dataset.extend(survivors);
        Reconciliation { dataset, added }
    }
}

/// Combines records sharing a trimmed CAS number. The first record of each
/// group is kept and only its absent fields are filled from later ones.
/// Records without a CAS number are never merged. Groups keep the order of
/// their first appearance.
pub fn merge_by_cas(records: Vec<SdsRecord>) -> Vec<SdsRecord> {
    let mut merged: Vec<SdsRecord> = Vec::with_capacity(records.len());
    let mut groups: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = record.cas_number().map(|cas| cas.trim().to_string());

        match key {
            Some(key) => match groups.get(&key) {
                Some(&position) => {
                    let filled = merged[position].fill_missing_from(&record);
                    debug!(cas_number = %key, filled = filled, "Merged duplicate CAS record");
                }
                None => {
                    groups.insert(key, merged.len());
                    merged.push(record);
                }
            },
            None => merged.push(record),
        }
    }

    merged
}

/// Lower-cased CAS numbers and descriptions of the existing dataset
struct ExistingIndex {
    cas_numbers: HashSet<String>,
    descriptions: HashSet<String>,
}

impl ExistingIndex {
    fn build(existing: &SdsDataset) -> Self {
        Self {
            cas_numbers: existing.iter().filter_map(|r| r.cas_number()).map(comparison_key).collect(),
            descriptions: existing.iter().filter_map(|r| r.description()).map(comparison_key).collect(),
        }
    }

    fn has_cas(&self, record: &SdsRecord) -> bool {
        record
            .cas_number()
            .map_or(false, |cas| self.cas_numbers.contains(&comparison_key(cas)))
    }

    fn has_description(&self, record: &SdsRecord) -> bool {
        record
            .description()
            .map_or(false, |desc| self.descriptions.contains(&comparison_key(desc)))
    }

    /// Every key the mode checks has to match
    fn is_duplicate(&self, record: &SdsRecord, mode: DuplicateCheckMode) -> bool {
        if mode == DuplicateCheckMode::None {
            return false;
        }

        (!mode.checks_cas() || self.has_cas(record))
            && (!mode.checks_description() || self.has_description(record))
    }
}

fn comparison_key(value: &str) -> String {
    value.trim().to_lowercase()
}
