//! First-match rule engine.
//!
//! A [`Rule`] pairs a labelled, case-insensitive pattern with a [`Transform`]
//! that turns its captures into a field value. A [`RuleSet`] tries its rules
//! in order and stops at the first one whose transform yields a value.

use regex::{Captures, Regex, RegexBuilder};
use sdsheet_models::Flammability;

use super::normalizer::{clean_auto, clean_text, convert_density, convert_pressure, normalize_numeric};

/// How the captures of a matched rule become a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Group 1 normalized to a number
    Numeric,
    /// Group 1 trimmed of whitespace and leading `:`/`-`
    Text,
    /// Numeric cleanup when group 1 holds a digit, text cleanup otherwise
    Auto,
    /// Group 1 kept verbatim apart from trimming
    Identifier,
    /// Group 1 value with the group 2 unit, converted to mmHg
    Pressure,
    /// Group 1 value with an optional group 2 unit, converted to g/cc
    Density,
    /// Groups 1 and 2 as lower and upper flammable limits
    LimitRange,
    /// A fixed value whenever the pattern matches
    Constant(&'static str),
}

impl Transform {
    pub fn apply(&self, captures: &Captures<'_>) -> Option<String> {
        let group = |index: usize| captures.get(index).map(|m| m.as_str());

        match self {
            Self::Numeric => normalize_numeric(group(1)?),
            Self::Text => clean_text(group(1)?),
            Self::Auto => clean_auto(group(1)?),
            Self::Identifier => {
                let value = group(1)?.trim();
                (!value.is_empty()).then(|| value.to_string())
            }
            Self::Pressure => convert_pressure(group(1)?, group(2)?),
            Self::Density => convert_density(group(1)?, group(2)),
            Self::LimitRange => {
                let lel = normalize_numeric(group(1)?)?;
                let uel = normalize_numeric(group(2)?)?;
                Some(Flammability::Range { lel, uel }.to_string())
            }
            Self::Constant(value) => Some(value.to_string()),
        }
    }
}

/// A successful rule application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: &'static str,
    pub value: String,
    /// Byte span of the whole match in the searched text
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct Rule {
    label: &'static str,
    pattern: Regex,
    transform: Transform,
    reject: Option<fn(&str) -> bool>,
}

impl Rule {
    /// Compiles a single-line rule. Patterns are static, so an invalid one
    /// is a programming error.
    pub fn new(label: &'static str, pattern: &str, transform: Transform) -> Self {
        Self::compile(label, pattern, transform, false)
    }

    /// Compiles a rule whose `.` also matches newlines, for values that
    /// can be split across lines.
    pub fn spanning(label: &'static str, pattern: &str, transform: Transform) -> Self {
        Self::compile(label, pattern, transform, true)
    }

    fn compile(label: &'static str, pattern: &str, transform: Transform, spanning: bool) -> Self {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .dot_matches_new_line(spanning)
            .build()
            .unwrap_or_else(|e| panic!("invalid pattern for rule '{}': {}", label, e));

        Self {
            label,
            pattern,
            transform,
            reject: None,
        }
    }

    /// Discards values for which `reject` returns true
    pub fn rejecting(mut self, reject: fn(&str) -> bool) -> Self {
        self.reject = Some(reject);
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Applies the rule to the first occurrence of its pattern
    pub fn apply(&self, text: &str) -> Option<RuleMatch> {
        let captures = self.pattern.captures(text)?;
        let whole = captures.get(0)?;
        let value = self.transform.apply(&captures)?;

        if self.reject.map_or(false, |reject| reject(&value)) {
            return None;
        }

        Some(RuleMatch {
            rule: self.label,
            value,
            start: whole.start(),
            end: whole.end(),
        })
    }
}

/// Ordered rules for one field
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn first_match(&self, text: &str) -> Option<RuleMatch> {
        self.rules.iter().find_map(|rule| rule.apply(text))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(Rule::label)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
