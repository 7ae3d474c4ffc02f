use serde::Serialize;

use crate::record::{SdsField, SdsRecord};

/// Ordered collection of SDS records sharing the fixed 18-column schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SdsDataset {
    records: Vec<SdsRecord>,
}

impl SdsDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<SdsRecord>) -> Self {
        Self { records }
    }

    /// Column headers of every dataset, in output order
    pub fn columns() -> [&'static str; SdsField::COUNT] {
        SdsField::column_names()
    }

    pub fn records(&self) -> &[SdsRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SdsRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: SdsRecord) {
        self.records.push(record);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SdsRecord> {
        self.records.iter()
    }

    /// Spreadsheet rows (without header) in canonical column order
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(SdsRecord::to_row)
    }
}

impl Extend<SdsRecord> for SdsDataset {
    fn extend<T: IntoIterator<Item = SdsRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl FromIterator<SdsRecord> for SdsDataset {
    fn from_iter<T: IntoIterator<Item = SdsRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SdsDataset {
    type Item = &'a SdsRecord;
    type IntoIter = std::slice::Iter<'a, SdsRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_schema() {
        let dataset: SdsDataset = vec![
            SdsRecord::from_source_name("Ethanol.pdf").with(SdsField::CasNumber, "64-17-5"),
            SdsRecord::from_source_name("Water.pdf"),
        ]
        .into_iter()
        .collect();

        let rows: Vec<Vec<String>> = dataset.rows().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == SdsDataset::columns().len()));
        assert_eq!(rows[0][1], "64-17-5");
        assert_eq!(rows[1][1], "NDA");
    }
}
