//! Value normalization for extracted SDS fields.
//!
//! Numeric fields keep only the first number-like token of a capture, with a
//! trailing comma-decimal (`1,5`) rewritten as a dot-decimal (`1.5`). Unit
//! helpers convert pressures to mmHg and densities to g/cc.

use once_cell::sync::Lazy;
use regex::Regex;
use sdsheet_models::{is_no_data, NO_DATA};

static LEADING_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[:\-\s]+").expect("leading punctuation pattern"));

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)*").expect("number pattern"));

static TRAILING_COMMA_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+),([0-9]+)$").expect("comma decimal pattern"));

static GROUPED_THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?$").expect("grouped thousands pattern"));

/// mmHg per unit of each supported pressure unit
const PRESSURE_UNITS: [(&str, f64); 6] = [
    ("atm", 760.0),
    ("kpa", 7.50062),
    ("hpa", 0.750062),
    ("mbar", 0.750062),
    ("pa", 0.00750062),
    ("torr", 1.0),
];

/// Normalizes a raw capture to its canonical numeric form, `None` when it
/// carries no data or no number.
pub fn normalize_numeric(raw: &str) -> Option<String> {
    if is_no_data(raw) {
        return None;
    }

    let stripped = LEADING_PUNCTUATION.replace(raw.trim(), "");
    let number = NUMBER.find(&stripped)?.as_str();

    Some(TRAILING_COMMA_DECIMAL.replace(number, "${1}.${2}").into_owned())
}

/// Sentinel-rendering form of [`normalize_numeric`]
pub fn normalize(raw: &str) -> String {
    normalize_numeric(raw).unwrap_or_else(|| NO_DATA.to_string())
}

/// Trims whitespace and leading `:`/`-` from a text capture
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned = LEADING_PUNCTUATION.replace(raw.trim(), "");
    let cleaned = cleaned.trim();

    if is_no_data(cleaned) {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Numeric cleanup for digit-bearing captures, text cleanup otherwise
pub fn clean_auto(raw: &str) -> Option<String> {
    if raw.chars().any(|c| c.is_ascii_digit()) {
        normalize_numeric(raw)
    } else {
        clean_text(raw)
    }
}

/// Parses a normalized value, treating commas as thousands separators
pub fn parse_number(value: &str) -> Option<f64> {
    value.replace(',', "").parse::<f64>().ok()
}

/// Converts a pressure reading to mmHg. mmHg readings keep their
/// normalized text, converted readings are rounded to one decimal.
pub fn convert_pressure(raw: &str, unit: &str) -> Option<String> {
    let value = normalize_numeric(raw)?;
    let unit: String = unit
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if unit == "mmhg" {
        return Some(value);
    }

    let factor = PRESSURE_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)?;

    let number = parse_number(&value)?;
    Some(format!("{:.1}", number * factor))
}

/// Converts a density reading to g/cc. kg/m³ and g/L are scaled down by
/// 1000; other units (and unitless specific gravity) pass through.
pub fn convert_density(raw: &str, unit: Option<&str>) -> Option<String> {
    let value = normalize_numeric(raw)?;

    match unit.map(|u| u.trim().to_lowercase()) {
        Some(unit) if unit.starts_with("kg/m") || unit == "g/l" => {
            // "1,050 kg/m3" groups thousands, it is not a decimal comma
            let digits = NUMBER.find(raw)?.as_str();
            let number = if GROUPED_THOUSANDS.is_match(digits) {
                parse_number(digits)?
            } else {
                parse_number(&value)?
            };
            Some(trim_decimal(format!("{:.4}", number / 1000.0)))
        }
        _ => Some(value),
    }
}

fn trim_decimal(formatted: String) -> String {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_numeric_values() {
        assert_eq!(normalize(": 78.3 °C"), "78.3");
        assert_eq!(normalize("- 13"), "13");
        assert_eq!(normalize("0,789 g/cm3"), "0.789");
        assert_eq!(normalize("approx. 1,013.25 hPa"), "1,013.25");
        assert_eq!(normalize("7060 mg/kg (rat)"), "7060");
    }

    #[test]
    fn test_normalize_no_data() {
        assert_eq!(normalize(""), NO_DATA);
        assert_eq!(normalize("  N/A "), NO_DATA);
        assert_eq!(normalize("not available"), NO_DATA);
        assert_eq!(normalize("nda"), NO_DATA);
        assert_eq!(normalize("no data"), NO_DATA);
        assert_eq!(normalize(", -"), NO_DATA);
    }

    #[test]
    fn test_only_the_final_comma_becomes_a_decimal_point() {
        assert_eq!(normalize("1,2,3"), "1,2.3");
        assert_eq!(normalize("1,2.3"), "1,2.3");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(" : Liquid "), Some("Liquid".to_string()));
        assert_eq!(clean_text("- clear, colourless"), Some("clear, colourless".to_string()));
        assert_eq!(clean_text(" : n/a"), None);
        assert_eq!(clean_text("   "), None);
    }

    #[test]
    fn test_clean_auto_dispatches_on_digits() {
        assert_eq!(clean_auto("Liquid"), Some("Liquid".to_string()));
        assert_eq!(clean_auto("1000 ppm (TWA)"), Some("1000".to_string()));
    }

    #[test]
    fn test_pressure_conversion() {
        assert_eq!(convert_pressure("1", "atm"), Some("760.0".to_string()));
        assert_eq!(convert_pressure("5,9", "kPa"), Some("44.3".to_string()));
        assert_eq!(convert_pressure("5800", "Pa"), Some("43.5".to_string()));
        assert_eq!(convert_pressure("44", "mmHg"), Some("44".to_string()));
        assert_eq!(convert_pressure("44", "mm Hg"), Some("44".to_string()));
        assert_eq!(convert_pressure("2", "torr"), Some("2.0".to_string()));
        assert_eq!(convert_pressure("12", "psi"), None);
        assert_eq!(convert_pressure("n/a", "atm"), None);
    }

    #[test]
    fn test_density_conversion() {
        assert_eq!(convert_density("789", Some("kg/m3")), Some("0.789".to_string()));
        assert_eq!(convert_density("1000", Some("g/L")), Some("1".to_string()));
        assert_eq!(convert_density("0.79", Some("g/cm³")), Some("0.79".to_string()));
        assert_eq!(convert_density("1.05", None), Some("1.05".to_string()));
    }

    #[test]
    fn test_density_in_kg_per_cubic_metre() {
        assert_eq!(convert_density("1,050", Some("kg/m3")), Some("1.05".to_string()));
        assert_eq!(convert_density("998.2", Some("kg/m³")), Some("0.9982".to_string()));
        assert_eq!(convert_density("998,2", Some("kg/m3")), Some("0.9982".to_string()));
        assert_eq!(convert_density("1,260", Some("g/L")), Some("1.26".to_string()));
        assert_eq!(convert_density("0.5", Some("kg/m3")), Some("0.0005".to_string()));
    }
}
