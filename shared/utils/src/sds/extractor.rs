//! SDS Field Extractor
//!
//! Turns the text of one safety data sheet into a canonical [`SdsRecord`],
//! remembering which rule produced each field.

use sdsheet_models::{FieldMatch, Flammability, SdsField, SdsRecord, DEFAULT_SOURCE_OF_INFORMATION};
use tracing::{debug, info, warn};

use super::library::{FieldLibrary, DEFAULT_VAPOUR_TEMPERATURE};
use super::rules::RuleMatch;
use crate::validation::validate_cas_number;

/// A record extracted from one document, with per-field provenance
#[derive(Debug, Clone)]
pub struct ExtractedRecord {
    pub source_name: String,
    pub record: SdsRecord,
    pub provenance: Vec<FieldMatch>,
}

impl ExtractedRecord {
    fn new(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            record: SdsRecord::from_source_name(source_name),
            provenance: Vec::new(),
        }
    }

    fn record_match(&mut self, field: SdsField, found: RuleMatch) {
        self.record_value(field, found.rule, found.value);
    }

    fn record_value(&mut self, field: SdsField, rule: &'static str, value: String) {
        debug!(
            document = %self.source_name,
            field = %field,
            rule = rule,
            value = %value,
            "Field matched"
        );
        self.record.set(field, Some(value));
        self.provenance.push(FieldMatch { field, rule });
    }

    fn record_flammability(&mut self, limits: Flammability, rules: &[&'static str]) {
        debug!(document = %self.source_name, limits = %limits, "Classified flammability");
        self.record
            .set(SdsField::FlammableLimits, Some(limits.to_string()));
        self.provenance.extend(rules.iter().map(|&rule| FieldMatch {
            field: SdsField::FlammableLimits,
            rule,
        }));
    }

    /// Label of the first rule that produced `field`
    pub fn rule_for(&self, field: SdsField) -> Option<&'static str> {
        self.provenance
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.rule)
    }
}

/// Pattern-based extractor over the shared [`FieldLibrary`]
#[derive(Debug, Clone)]
pub struct SdsExtractor {
    library: &'static FieldLibrary,
    source_of_information: String,
}

impl Default for SdsExtractor {
    fn default() -> Self {
        Self {
            library: FieldLibrary::global(),
            source_of_information: DEFAULT_SOURCE_OF_INFORMATION.to_string(),
        }
    }
}

impl SdsExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value written to the `Source of Information` column
    pub fn with_source_of_information(mut self, source: impl Into<String>) -> Self {
        self.source_of_information = source.into();
        self
    }

    /// Extracts every field from `text`. Fields without a match stay absent.
    pub fn extract(&self, text: &str, source_name: &str) -> ExtractedRecord {
        let library = self.library;
        let mut extracted = ExtractedRecord::new(source_name);

        if let Some(found) = library.cas_number.first_match(text) {
            if let Err(e) = validate_cas_number(&found.value) {
                warn!(
                    document = %source_name,
                    cas_number = %found.value,
                    error = %e,
                    "Extracted CAS number failed validation"
                );
            }
            extracted.record_match(SdsField::CasNumber, found);
        }

        for (field, rules) in library.scalar_rules() {
            if let Some(found) = rules.first_match(text) {
                extracted.record_match(field, found);
            }
        }

        if let Some(found) = library.static_hazard.first_match(text) {
            extracted.record_match(SdsField::StaticHazard, found);
        }

        self.extract_vapour_pressure(text, &mut extracted);
        self.extract_flammable_limits(text, &mut extracted);

        extracted.record.set(
            SdsField::SourceOfInformation,
            Some(self.source_of_information.clone()),
        );

        info!(
            document = %source_name,
            fields_found = extracted.provenance.len(),
            "Extracted SDS record"
        );

        extracted
    }

    /// Pressure in mmHg plus the temperature stated next to it
    fn extract_vapour_pressure(&self, text: &str, extracted: &mut ExtractedRecord) {
        let temperature = match self.library.vapour_pressure.first_match(text) {
            Some(found) => {
                let nearby = following_lines(text, found.end, 2);
                let temperature = self
                    .library
                    .vapour_temperature
                    .captures(nearby)
                    .and_then(|captures| captures.get(1))
                    .map(|m| m.as_str().to_string());

                extracted.record_match(SdsField::VapourPressure, found);
                temperature
            }
            None => None,
        };

        match temperature {
            Some(value) => extracted.record_value(
                SdsField::VapourPressureTemperature,
                "temperature near vapour pressure",
                value,
            ),
            None => extracted.record.set(
                SdsField::VapourPressureTemperature,
                Some(DEFAULT_VAPOUR_TEMPERATURE.to_string()),
            ),
        }
    }

    /// Paired limits first, then independent LEL/UEL, then explicit
    /// non-flammability statements
    fn extract_flammable_limits(&self, text: &str, extracted: &mut ExtractedRecord) {
        let library = self.library;

        if let Some(found) = library.limit_pairs.first_match(text) {
            extracted.record_match(SdsField::FlammableLimits, found);
            return;
        }

        let lower = library.lower_limit.first_match(text);
        let upper = library.upper_limit.first_match(text);
        let rules: Vec<&'static str> = lower.iter().chain(upper.iter()).map(|m| m.rule).collect();

        let limits = Flammability::from_limits(lower.map(|m| m.value), upper.map(|m| m.value));
        if let Some(limits) = limits {
            extracted.record_flammability(limits, &rules);
            return;
        }

        if let Some(found) = library.non_flammable.first_match(text) {
            extracted.record_flammability(Flammability::NonFlammable, &[found.rule]);
        }
    }
}

/// The rest of the line containing `from` plus the following `lines - 1` lines
fn following_lines(text: &str, from: usize, lines: usize) -> &str {
    let rest = &text[from..];
    match rest.match_indices('\n').nth(lines.saturating_sub(1)) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}
