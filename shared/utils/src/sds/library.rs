//! Pattern library for every extracted SDS field.
//!
//! Rules are listed in priority order and compiled once per process.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use sdsheet_models::{Flammability, SdsField, StaticHazard};

use super::rules::{Rule, RuleSet, Transform};

/// Vapour-pressure temperature used when the sheet does not state one
pub const DEFAULT_VAPOUR_TEMPERATURE: &str = "21";

/// Longest product name accepted as a composition value
const MAX_COMPOSITION_LENGTH: usize = 60;

static FIELD_LIBRARY: Lazy<FieldLibrary> = Lazy::new(FieldLibrary::build);

const NUMBER: &str = r"(\d[\d,]*[.,]?\d*)";
const PERCENT: &str = r"(\d+(?:\.\d+)?)";
/// Wording that has to precede an unlabelled bracketed range
const LIMIT_LABEL: &str = r"(?:\bLEL|\bLFL|\b(?:flammab|explosi)\w*\s+(?:limits?|range))";
const CAS: &str = r"(\d{2,7}-\d{2}-\d)\b";

/// Compiled rules, one rule set per field
#[derive(Debug)]
pub struct FieldLibrary {
    pub cas_number: RuleSet,
    pub physical_state: RuleSet,
    pub composition: RuleSet,
    pub static_hazard: RuleSet,
    pub vapour_pressure: RuleSet,
    pub vapour_temperature: Regex,
    pub flash_point: RuleSet,
    pub limit_pairs: RuleSet,
    pub lower_limit: RuleSet,
    pub upper_limit: RuleSet,
    pub non_flammable: RuleSet,
    pub melting_point: RuleSet,
    pub boiling_point: RuleSet,
    pub density: RuleSet,
    pub relative_vapour_density: RuleSet,
    pub ignition_temperature: RuleSet,
    pub threshold_limit_value: RuleSet,
    pub immediate_danger: RuleSet,
    pub ld50: RuleSet,
}

impl FieldLibrary {
    /// The shared library
    pub fn global() -> &'static FieldLibrary {
        &FIELD_LIBRARY
    }

    /// Single-rule-set fields whose first match is stored as is
    pub fn scalar_rules(&self) -> [(SdsField, &RuleSet); 11] {
        [
            (SdsField::PhysicalState, &self.physical_state),
            (SdsField::Composition, &self.composition),
            (SdsField::FlashPoint, &self.flash_point),
            (SdsField::MeltingPoint, &self.melting_point),
            (SdsField::BoilingPoint, &self.boiling_point),
            (SdsField::Density, &self.density),
            (SdsField::RelativeVapourDensity, &self.relative_vapour_density),
            (SdsField::IgnitionTemperature, &self.ignition_temperature),
            (SdsField::ThresholdLimitValue, &self.threshold_limit_value),
            (SdsField::ImmediateDangerToLife, &self.immediate_danger),
            (SdsField::Ld50, &self.ld50),
        ]
    }

    fn build() -> Self {
        Self {
            cas_number: cas_rules(),
            physical_state: RuleSet::new(vec![
                Rule::new("physical state", r"Physical\s+state\s*:?\s*([^\n\r.]+)", Transform::Auto),
                Rule::new("state", r"\bState\b\s*:?\s*([^\n\r.]+)", Transform::Auto),
            ]),
            composition: composition_rules(),
            static_hazard: static_hazard_rules(),
            vapour_pressure: vapour_pressure_rules(),
            vapour_temperature: RegexBuilder::new(r"(?:\bat|@)\s*(\d+)\s*°?\s*C\b")
                .case_insensitive(true)
                .build()
                .expect("vapour temperature pattern"),
            flash_point: RuleSet::new(vec![Rule::new(
                "flash point",
                r"Flash\s+point\s*:?\s*([\d\-,]+[.,]?\d*)",
                Transform::Auto,
            )]),
            limit_pairs: limit_pair_rules(),
            lower_limit: single_limit_rules([
                ("LEL", r"LEL"),
                ("lower explosive limit", r"Lower\s+explosive\s+limit"),
                ("LFL", r"LFL"),
                ("lower flammable limit", r"Lower\s+flammable\s+limit"),
            ]),
            upper_limit: single_limit_rules([
                ("UEL", r"UEL"),
                ("upper explosive limit", r"Upper\s+explosive\s+limit"),
                ("UFL", r"UFL"),
                ("upper flammable limit", r"Upper\s+flammable\s+limit"),
            ]),
            non_flammable: non_flammable_rules(),
            melting_point: RuleSet::new(vec![Rule::new(
                "melting point",
                r"Melting\s+point\s*:?\s*([\d\-,]+[.,]?\d*)",
                Transform::Auto,
            )]),
            boiling_point: RuleSet::new(vec![Rule::new(
                "boiling point",
                r"Boiling\s+point\s*:?\s*([\d\-,]+[.,]?\d*)",
                Transform::Auto,
            )]),
            density: RuleSet::new(vec![
                Rule::new(
                    "density with unit",
                    r"Density.*?(\d+[,.]?\d*)\s*(kg/m3|kg/m³|g/cm3|g/cm³|g/mL|g/L)",
                    Transform::Density,
                ),
                Rule::new(
                    "labelled density",
                    &format!(r"Density\s*:?\s*{}\s*(g/cm³|g/cc|kg/m³)", NUMBER),
                    Transform::Density,
                ),
                Rule::new(
                    "specific gravity",
                    &format!(r"Specific\s+gravity\s*:?\s*{}", NUMBER),
                    Transform::Density,
                ),
            ]),
            relative_vapour_density: RuleSet::new(vec![Rule::new(
                "relative vapour density",
                &format!(r"Relative\s+vapou?r\s+density\s*:?\s*{}", NUMBER),
                Transform::Numeric,
            )]),
            ignition_temperature: RuleSet::new(vec![Rule::new(
                "auto-ignition temperature",
                &format!(r"(?:Auto|Self)[-\s]?ignition\s+temperature\s*:?\s*{}", NUMBER),
                Transform::Numeric,
            )]),
            threshold_limit_value: RuleSet::new(vec![Rule::new(
                "TLV",
                r"TLV\s*:?\s*([^\n\r]+)",
                Transform::Auto,
            )]),
            immediate_danger: RuleSet::new(vec![Rule::new(
                "LC50",
                r"LC50\s*[-:]\s*.*?([0-9,]+.*?)\s*(mg|g|ppm|mL|L)",
                Transform::Auto,
            )]),
            ld50: RuleSet::new(vec![
                Rule::new("LD50", &format!(r"LD50.*?{}\s*mg/kg", NUMBER), Transform::Numeric),
                Rule::new("labelled LD50", &format!(r"LD50\s*:?\s*{}\s*mg/kg", NUMBER), Transform::Numeric),
                Rule::new(
                    "oral or dermal LD50",
                    &format!(r"LD50\s*:?\s*(?:oral|dermal)?\s*{}\s*mg/kg", NUMBER),
                    Transform::Numeric,
                ),
                Rule::new(
                    "subscript LD50",
                    &format!(r"LD₅₀\s*:?\s*(?:oral|dermal)?\s*{}\s*mg/kg", NUMBER),
                    Transform::Numeric,
                ),
            ]),
        }
    }
}

fn cas_rules() -> RuleSet {
    let labelled = [
        ("CAS-No.", r"CAS-No\.?"),
        ("CAS No", r"CAS\s+No\.?"),
        ("CAS number", r"CAS\s+number"),
        ("CAS#", r"CAS#?"),
        ("【CAS】", r"【CAS】"),
        ("CAS prefix", r"CAS(?:\s*-?\s*(?:No|NUMBER|#))?"),
    ];

    labelled
        .iter()
        .map(|&(label, prefix)| {
            Rule::new(
                label,
                &format!(r"{}\s*[:\-]?\s*[\[\(]?\s*{}", prefix, CAS),
                Transform::Identifier,
            )
        })
        .chain(std::iter::once(Rule::new("bare CAS", &format!(r"\b{}", CAS), Transform::Identifier)))
        .collect()
}

fn composition_rules() -> RuleSet {
    let labels = [
        ("Product name", r"Product name[:\s]*([^\n\r]+)"),
        ("Product Name", r"Product Name[:\s]*([^\n\r]+)"),
        ("PRODUCT NAME", r"PRODUCT NAME[:\s]*([^\n\r]+)"),
        ("Product Name:", r"Product Name:[:\s]*([^\n\r]+)"),
        ("Product name :", r"Product name\s*:[:\s]*([^\n\r]+)"),
        ("Identification of the substance", r"Identification of the substance[:\s]*([^\n\r]+)"),
    ];

    labels
        .iter()
        .map(|&(label, pattern)| Rule::new(label, pattern, Transform::Text).rejecting(is_not_a_product_name))
        .collect()
}

/// Section headings and company lines picked up after a product-name label
fn is_not_a_product_name(value: &str) -> bool {
    value.chars().count() > MAX_COMPOSITION_LENGTH
        || value.contains('/')
        || value.to_lowercase().contains("company")
}

fn static_hazard_rules() -> RuleSet {
    fn tagged(rules: &[(&'static str, &'static str)], transform: Transform) -> Vec<Rule> {
        rules
            .iter()
            .map(|&(label, pattern)| Rule::new(label, pattern, transform))
            .collect()
    }

    let no = Transform::Constant(StaticHazard::No.as_str());
    let yes = Transform::Constant(StaticHazard::Yes.as_str());

    let explicit_no = [
        ("no static hazard", r"no\s+static\s+hazard"),
        ("static hazard: no", r"static\s+hazard\s*:?\s*no\b"),
        ("not static sensitive", r"not\s+static\s+sensitive"),
        ("no electrostatic hazard", r"no\s+electrostatic\s+hazard"),
        ("static discharge not applicable", r"static\s+discharge\s*:?\s*not\s+applicable"),
        ("static discharge n/a", r"static\s+discharge\s*:?\s*n/?a\b"),
    ];
    let mentions = [
        ("static discharge", r"static\s+discharge"),
        ("electrostatic discharge", r"electrostatic\s+discharge"),
        ("static electricity", r"static\s+electricity"),
        ("electrostatic charge", r"electrostatic\s+charge"),
        ("static charge", r"static\s+charge"),
        ("precautions against static discharge", r"precautionary\s+measures\s+against\s+static\s+discharge"),
        ("measures to prevent static", r"measures\s+to\s+prevent.*static"),
        ("ground and bond container", r"ground.*bond.*container"),
        ("grounding and bonding", r"grounding.*bonding"),
        ("anti-static", r"anti[-\s]?static"),
        ("static sensitive", r"static\s+sensitive"),
        ("electrostatic ignition", r"electrostatic\s+ignition"),
        ("static buildup", r"static\s+buildup"),
    ];
    let handling_sections = [
        ("section 7 handling", r"SECTION\s*7.*?(?:handling|storage)"),
        ("handling and storage", r"handling\s+and\s+storage"),
        ("precautions for safe handling", r"precautions\s+for\s+safe\s+handling"),
        ("storage conditions", r"storage\s+conditions"),
    ];

    let mut rules = tagged(&explicit_no, no);
    rules.extend(tagged(&mentions, yes));
    rules.extend(tagged(&handling_sections, no));
    RuleSet::new(rules)
}

fn vapour_pressure_rules() -> RuleSet {
    let labelled = |label: &'static str, unit: &str| {
        Rule::new(
            label,
            &format!(r"Vapou?r\s+pressure\s*:?\s*{}\s*({})\b", NUMBER, unit),
            Transform::Pressure,
        )
    };

    RuleSet::new(vec![
        labelled("vapour pressure atm", "atm"),
        labelled("vapour pressure mmHg", r"mm\s?Hg|torr"),
        labelled("vapour pressure kPa", "kPa"),
        labelled("vapour pressure hPa", "hPa|mbar"),
        labelled("vapour pressure Pa", "Pa"),
        Rule::new(
            "pressure with unit",
            &format!(r"Pressure\s*:?\s*{}\s*(atm|mm\s?Hg|torr|kPa|hPa|mbar|Pa)\b", NUMBER),
            Transform::Pressure,
        ),
    ])
}

fn limit_pair_rules() -> RuleSet {
    let range = r"\s*%?\s*[-–—]\s*";
    let vol = r"\s*(?:vol\s*%|%\s*vol|%|volume\s*%)";

    RuleSet::new(vec![
        Rule::spanning(
            "LEL..UEL",
            &format!(r"LEL[:\s]*{p}\s*%.*?UEL[:\s]*{p}\s*%", p = PERCENT),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "lower..upper explosive limit",
            &format!(
                r"Lower\s+explosive\s+limit[:\s]*{p}\s*%.*?Upper\s+explosive\s+limit[:\s]*{p}\s*%",
                p = PERCENT
            ),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "LFL..UFL",
            &format!(r"LFL[:\s]*{p}\s*%.*?UFL[:\s]*{p}\s*%", p = PERCENT),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "labelled range",
            &format!(
                r"(?:LEL|Lower\s+explosive\s+limit|LFL|Flammable\s+limits?)[:\s]*{p}{r}{p}\s*%",
                p = PERCENT,
                r = range
            ),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "explosive limits range",
            &format!(r"Explosive\s+limits?[:\s]*{p}{r}{p}\s*%", p = PERCENT, r = range),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "flammability limits range",
            &format!(r"Flammability\s+limits?[:\s]*{p}{r}{p}\s*%", p = PERCENT, r = range),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "parenthesized range",
            &format!(r"{l}[^\n(]{{0,40}}\(\s*{p}{r}{p}\s*%?\s*\)", l = LIMIT_LABEL, p = PERCENT, r = range),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "parenthesized LEL/UEL",
            &format!(r"\(\s*LEL[:\s]*{p}\s*%.*?UEL[:\s]*{p}\s*%\s*\)", p = PERCENT),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "vol% table",
            &format!(
                r"(?:LEL|Lower\s+(?:explosive|flammab\w*)\s+limit)[:\s]*{p}{v}.*?(?:UEL|Upper\s+(?:explosive|flammab\w*)\s+limit)[:\s]*{p}{v}",
                p = PERCENT,
                v = vol
            ),
            Transform::LimitRange,
        ),
        Rule::spanning(
            "flammable or explosive range",
            &format!(
                r"(?:Flammable|Explosive)\s+(?:range|limits?)[:\s]*{p}\s*[-–—]\s*{p}\s*%",
                p = PERCENT
            ),
            Transform::LimitRange,
        ),
    ])
}

fn single_limit_rules(labels: [(&'static str, &str); 4]) -> RuleSet {
    labels
        .iter()
        .map(|&(label, prefix)| {
            Rule::new(label, &format!(r"{}[:\s]*{}\s*%", prefix, PERCENT), Transform::Numeric)
        })
        .collect()
}

fn non_flammable_rules() -> RuleSet {
    let statement = Transform::Constant(Flammability::NON_FLAMMABLE);

    let statements = [
        ("not flammable", r"not\s+flammable"),
        ("non-flammable", r"non[-\s]?flammable"),
        ("flammable limits n/a", r"flammable\s+limits?\s*:?\s*(?:not\s+applicable|n/?a\b)"),
        ("explosive limits n/a", r"explosive\s+limits?\s*:?\s*(?:not\s+applicable|n/?a\b)"),
        ("does not burn", r"does\s+not\s+burn"),
        ("will not burn", r"will\s+not\s+burn"),
        ("non-combustible", r"non[-\s]?combustible"),
        ("not combustible", r"not\s+combustible"),
    ];

    statements
        .iter()
        .map(|&(label, pattern)| Rule::new(label, pattern, statement))
        .collect()
}
