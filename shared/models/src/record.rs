//! Safety-data-sheet record schema.
//!
//! A record always carries the same 18 fields in the same order. Absent
//! values are `None` internally and only become the `"NDA"` sentinel when
//! rendered for a spreadsheet row or serialized.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::path::Path;

/// Sentinel written for any field without data ("No Data Available").
pub const NO_DATA: &str = "NDA";

/// Value of the `Source of Information` column when nothing else is configured.
pub const DEFAULT_SOURCE_OF_INFORMATION: &str = "MSDS";

/// The fixed, ordered field set of an SDS record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SdsField {
    Description,
    CasNumber,
    PhysicalState,
    Composition,
    StaticHazard,
    VapourPressure,
    VapourPressureTemperature,
    FlashPoint,
    FlammableLimits,
    MeltingPoint,
    BoilingPoint,
    Density,
    RelativeVapourDensity,
    IgnitionTemperature,
    ThresholdLimitValue,
    ImmediateDangerToLife,
    Ld50,
    SourceOfInformation,
}

impl SdsField {
    pub const COUNT: usize = 18;

    /// All fields in canonical column order.
    pub const ALL: [SdsField; Self::COUNT] = [
        Self::Description,
        Self::CasNumber,
        Self::PhysicalState,
        Self::Composition,
        Self::StaticHazard,
        Self::VapourPressure,
        Self::VapourPressureTemperature,
        Self::FlashPoint,
        Self::FlammableLimits,
        Self::MeltingPoint,
        Self::BoilingPoint,
        Self::Density,
        Self::RelativeVapourDensity,
        Self::IgnitionTemperature,
        Self::ThresholdLimitValue,
        Self::ImmediateDangerToLife,
        Self::Ld50,
        Self::SourceOfInformation,
    ];

    /// Spreadsheet column header for this field
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::CasNumber => "CAS Number",
            Self::PhysicalState => "Physical state (solid/liquid/gas)",
            Self::Composition => "Composition",
            Self::StaticHazard => "Static Hazard",
            Self::VapourPressure => "Vapour Pressure (in mmHg)",
            Self::VapourPressureTemperature => "at temp (in degC)",
            Self::FlashPoint => "Flash Point (°C)",
            Self::FlammableLimits => "Flammable Limits by Volume (LEL, UEL)",
            Self::MeltingPoint => "Melting Point (°C)",
            Self::BoilingPoint => "Boiling Point (°C)",
            Self::Density => "Density (g/cc)",
            Self::RelativeVapourDensity => "Relative Vapour Density (Air = 1)",
            Self::IgnitionTemperature => "Ignition Temperature (°C)",
            Self::ThresholdLimitValue => "Threshold Limit Value (ppm)",
            Self::ImmediateDangerToLife => "Immediate Danger to Life in Humans",
            Self::Ld50 => "Toxicological Info LD50 (mg/kg)",
            Self::SourceOfInformation => "Source of Information",
        }
    }

    /// Looks a field up by its exact (trimmed) column header
    pub fn from_column_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.iter().copied().find(|field| field.column_name() == name)
    }

    /// Position of the field in canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column headers in canonical order
    pub fn column_names() -> [&'static str; Self::COUNT] {
        Self::ALL.map(Self::column_name)
    }
}

impl fmt::Display for SdsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl Serialize for SdsField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.column_name())
    }
}

/// Returns true for tokens meaning "no data": empty, `NDA`, `n/a`,
/// `not available`, and `nan` (blank spreadsheet cells).
pub fn is_no_data(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "" | "nda" | "n/a" | "not available" | "nan"
    )
}

/// Derives the record description from a document name: base name with
/// the extension stripped.
pub fn description_from_source_name(source_name: &str) -> String {
    let path = Path::new(source_name.trim());
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_name.trim().to_string())
}

/// One SDS row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdsRecord {
    values: [Option<String>; SdsField::COUNT],
}

impl SdsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record whose description is derived from the document name
    pub fn from_source_name(source_name: &str) -> Self {
        let mut record = Self::new();
        record.set(
            SdsField::Description,
            Some(description_from_source_name(source_name)),
        );
        record
    }

    /// Builds a record from `(column header, cell)` pairs. Unknown headers
    /// are ignored and no-data cells stay absent.
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = Self::new();
        for (header, cell) in cells {
            if let Some(field) = SdsField::from_column_name(header) {
                record.set(field, Some(cell.to_string()));
            }
        }
        record
    }

    /// Builder-style setter
    pub fn with(mut self, field: SdsField, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    pub fn get(&self, field: SdsField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    /// Sets a field. Values are trimmed; no-data tokens clear the field.
    pub fn set(&mut self, field: SdsField, value: Option<String>) {
        self.values[field.index()] = value
            .map(|v| v.trim().to_string())
            .filter(|v| !is_no_data(v));
    }

    pub fn is_present(&self, field: SdsField) -> bool {
        self.values[field.index()].is_some()
    }

    /// Field value, or the `"NDA"` sentinel when absent
    pub fn value_or_sentinel(&self, field: SdsField) -> &str {
        self.get(field).unwrap_or(NO_DATA)
    }

    pub fn description(&self) -> Option<&str> {
        self.get(SdsField::Description)
    }

    pub fn cas_number(&self) -> Option<&str> {
        self.get(SdsField::CasNumber)
    }

    /// Fills every absent field from `other`. Fields already present are
    /// never overwritten. Returns the number of fields filled.
    pub fn fill_missing_from(&mut self, other: &SdsRecord) -> usize {
        let mut filled = 0;
        for (slot, candidate) in self.values.iter_mut().zip(other.values.iter()) {
            if slot.is_none() {
                if let Some(value) = candidate {
                    *slot = Some(value.clone());
                    filled += 1;
                }
            }
        }
        filled
    }

    /// Number of fields carrying data
    pub fn populated_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// `(field, rendered value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (SdsField, &str)> + '_ {
        SdsField::ALL
            .iter()
            .map(move |&field| (field, self.value_or_sentinel(field)))
    }

    /// Renders the record as a spreadsheet row in canonical order
    pub fn to_row(&self) -> Vec<String> {
        self.iter().map(|(_, value)| value.to_string()).collect()
    }
}

impl Serialize for SdsRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SdsField::COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.column_name(), value)?;
        }
        map.end()
    }
}

/// Checks the `\d{2,7}-\d{2}-\d` shape of a CAS registry number
pub fn is_cas_format(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != 3 {
        return false;
    }

    if !(2..=7).contains(&parts[0].len()) || parts[1].len() != 2 || parts[2].len() != 1 {
        return false;
    }

    parts.iter().all(|part| part.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order_is_canonical() {
        let columns = SdsField::column_names();
        assert_eq!(columns.len(), 18);
        assert_eq!(columns[0], "Description");
        assert_eq!(columns[1], "CAS Number");
        assert_eq!(columns[8], "Flammable Limits by Volume (LEL, UEL)");
        assert_eq!(columns[17], "Source of Information");

        for (position, field) in SdsField::ALL.iter().enumerate() {
            assert_eq!(field.index(), position);
            assert_eq!(SdsField::from_column_name(field.column_name()), Some(*field));
        }
    }

    #[test]
    fn test_description_strips_extension_and_directories() {
        assert_eq!(description_from_source_name("Ethanol.pdf"), "Ethanol");
        assert_eq!(description_from_source_name("uploads/Acetone SDS.PDF"), "Acetone SDS");
        assert_eq!(description_from_source_name("sodium.hydroxide.pdf"), "sodium.hydroxide");
        assert_eq!(description_from_source_name("README"), "README");
    }

    #[test]
    fn test_no_data_tokens_clear_fields() {
        let mut record = SdsRecord::new();
        record.set(SdsField::Density, Some("  n/a ".to_string()));
        assert!(!record.is_present(SdsField::Density));

        record.set(SdsField::Density, Some(" 0.79 ".to_string()));
        assert_eq!(record.get(SdsField::Density), Some("0.79"));

        record.set(SdsField::Density, Some("NDA".to_string()));
        assert_eq!(record.value_or_sentinel(SdsField::Density), NO_DATA);
    }

    #[test]
    fn test_row_always_has_every_column() {
        let record = SdsRecord::from_source_name("Water.pdf").with(SdsField::CasNumber, "7732-18-5");
        let row = record.to_row();

        assert_eq!(row.len(), SdsField::COUNT);
        assert_eq!(row[0], "Water");
        assert_eq!(row[1], "7732-18-5");
        assert!(row[2..].iter().all(|cell| cell == NO_DATA));
    }

    #[test]
    fn test_fill_missing_keeps_existing_values() {
        let mut first = SdsRecord::new()
            .with(SdsField::CasNumber, "7732-18-5")
            .with(SdsField::FlashPoint, "12");
        let second = SdsRecord::new()
            .with(SdsField::FlashPoint, "99")
            .with(SdsField::Density, "1.0");

        assert_eq!(first.fill_missing_from(&second), 1);
        assert_eq!(first.get(SdsField::FlashPoint), Some("12"));
        assert_eq!(first.get(SdsField::Density), Some("1.0"));
    }

    #[test]
    fn test_from_cells_ignores_unknown_headers() {
        let record = SdsRecord::from_cells(vec![
            ("Description", "Acetone"),
            (" CAS Number ", "67-64-1"),
            ("Supplier", "Acme"),
            ("Density (g/cc)", "nan"),
        ]);

        assert_eq!(record.description(), Some("Acetone"));
        assert_eq!(record.cas_number(), Some("67-64-1"));
        assert!(!record.is_present(SdsField::Density));
        assert_eq!(record.populated_count(), 2);
    }

    #[test]
    fn test_serialization_preserves_column_order() {
        let record = SdsRecord::from_source_name("Water.pdf");
        let json = serde_json::to_string(&record).unwrap();

        let description_at = json.find("\"Description\"").unwrap();
        let cas_at = json.find("\"CAS Number\"").unwrap();
        let source_at = json.find("\"Source of Information\"").unwrap();
        assert!(description_at < cas_at && cas_at < source_at);
        assert!(json.contains("\"Density (g/cc)\":\"NDA\""));
    }

    #[test]
    fn test_cas_format() {
        assert!(is_cas_format("7732-18-5"));
        assert!(is_cas_format("64-17-5"));
        assert!(!is_cas_format("123-45"));
        assert!(!is_cas_format("12345678-12-1"));
        assert!(!is_cas_format("abc-de-f"));
    }
}
