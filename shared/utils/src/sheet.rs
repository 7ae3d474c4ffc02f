//! SDS Sheet Adapter
//!
//! Loads an existing SDS dataset from CSV or Excel files and writes the
//! reconciled dataset back out as CSV.

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_from_rs, DataType, Reader, Xls, Xlsx};
use sdsheet_models::{SdsDataset, SdsField, SdsRecord};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{SdsError, SdsResult};

/// Supported sheet formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xlsx,
    Xls,
}

impl SheetFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }
}

/// Reads sheets whose header row uses the SDS column names
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetReader;

impl SheetReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a sheet from bytes. The format is taken from `filename` when
    /// not given.
    pub fn parse_bytes(
        &self,
        filename: &str,
        data: &[u8],
        format: Option<SheetFormat>,
    ) -> SdsResult<SdsDataset> {
        self.parse_dataset(filename, data, format)
            .map_err(|e| SdsError::malformed_dataset(format!("{}: {:#}", filename, e)))
    }

    fn parse_dataset(&self, filename: &str, data: &[u8], format: Option<SheetFormat>) -> Result<SdsDataset> {
        let format = format
            .or_else(|| SheetFormat::from_extension(Path::new(filename)))
            .context("Could not determine sheet format")?;

        let rows = match format {
            SheetFormat::Csv => read_csv_rows(data)?,
            SheetFormat::Xlsx => read_workbook_rows::<Xlsx<_>>(data)?,
            SheetFormat::Xls => read_workbook_rows::<Xls<_>>(data)?,
        };

        let dataset = dataset_from_rows(rows)?;
        debug!(filename = %filename, format = ?format, records = dataset.len(), "Parsed sheet");
        Ok(dataset)
    }
}

/// Reads the existing dataset stored at `path`
pub fn load_existing(path: &Path) -> SdsResult<SdsDataset> {
    let data = std::fs::read(path)?;
    let filename = path.to_string_lossy();
    let dataset = SheetReader::new().parse_bytes(&filename, &data, None)?;

    info!(path = %path.display(), records = dataset.len(), "Loaded existing dataset");
    Ok(dataset)
}

/// Writes the header row and one row per record, absent fields as the
/// sentinel
pub fn write_csv<W: Write>(dataset: &SdsDataset, writer: W) -> SdsResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(SdsDataset::columns())?;

    for row in dataset.rows() {
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes the dataset to a CSV file at `path`
pub fn save_csv(dataset: &SdsDataset, path: &Path) -> SdsResult<()> {
    let file = File::create(path)?;
    write_csv(dataset, file)?;

    info!(path = %path.display(), records = dataset.len(), "Wrote dataset");
    Ok(())
}

fn read_csv_rows(data: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Row {}: parse error", idx + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}

fn read_workbook_rows<'a, R>(data: &'a [u8]) -> Result<Vec<Vec<String>>>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::error::Error + Send + Sync + 'static,
{
    let mut workbook: R = open_workbook_from_rs(Cursor::new(data))
        .context("Failed to open workbook")?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("No sheets found in workbook")?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .context("Failed to read worksheet")??;

    Ok(range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell: &DataType| match cell {
                    DataType::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect())
}

/// First row is the header; columns are matched by exact trimmed name
fn dataset_from_rows(rows: Vec<Vec<String>>) -> Result<SdsDataset> {
    let mut rows = rows.into_iter();
    let header = rows.next().context("Sheet has no header row")?;

    let columns: Vec<Option<SdsField>> = header
        .iter()
        .map(|name| SdsField::from_column_name(name))
        .collect();

    if columns.iter().all(Option::is_none) {
        bail!("Header row contains none of the SDS columns");
    }

    let dataset = rows
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            SdsRecord::from_cells(
                columns
                    .iter()
                    .zip(row.iter())
                    .filter_map(|(column, cell)| column.map(|field| (field.column_name(), cell.as_str()))),
            )
        })
        .collect();

    Ok(dataset)
}
