//! Processing options chosen per batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How newly extracted records are compared against the existing sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateCheckMode {
    /// Every new record is appended.
    None,
    /// Drop records whose CAS number is already present.
    Cas,
    /// Drop records whose description is already present.
    #[default]
    Description,
    /// Drop records only when both CAS number and description are present.
    Both,
}

impl DuplicateCheckMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cas => "cas",
            Self::Description => "description",
            Self::Both => "both",
        }
    }

    pub fn checks_cas(self) -> bool {
        matches!(self, Self::Cas | Self::Both)
    }

    pub fn checks_description(self) -> bool {
        matches!(self, Self::Description | Self::Both)
    }
}

impl fmt::Display for DuplicateCheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown duplicate check mode '{0}' (expected none, cas, description or both)")]
pub struct ParseDuplicateCheckModeError(pub String);

impl FromStr for DuplicateCheckMode {
    type Err = ParseDuplicateCheckModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "cas" => Ok(Self::Cas),
            "description" => Ok(Self::Description),
            "both" => Ok(Self::Both),
            other => Err(ParseDuplicateCheckModeError(other.to_string())),
        }
    }
}

/// Options for one reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    pub merge_duplicates: bool,
    pub duplicate_check: DuplicateCheckMode,
}

impl ProcessingOptions {
    pub fn new(merge_duplicates: bool, duplicate_check: DuplicateCheckMode) -> Self {
        Self {
            merge_duplicates,
            duplicate_check,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("CAS".parse::<DuplicateCheckMode>(), Ok(DuplicateCheckMode::Cas));
        assert_eq!(" both ".parse::<DuplicateCheckMode>(), Ok(DuplicateCheckMode::Both));
        assert_eq!("none".parse::<DuplicateCheckMode>(), Ok(DuplicateCheckMode::None));
        assert!("fuzzy".parse::<DuplicateCheckMode>().is_err());
    }

    #[test]
    fn test_mode_criteria() {
        assert!(!DuplicateCheckMode::None.checks_cas());
        assert!(!DuplicateCheckMode::None.checks_description());
        assert!(DuplicateCheckMode::Both.checks_cas());
        assert!(DuplicateCheckMode::Both.checks_description());
        assert!(DuplicateCheckMode::Description.checks_description());
        assert!(!DuplicateCheckMode::Description.checks_cas());
    }

    #[test]
    fn test_options_json_shape() {
        let options = ProcessingOptions::new(true, DuplicateCheckMode::Both);
        let json = serde_json::to_value(options).unwrap();
        assert_eq!(json["mergeDuplicates"], true);
        assert_eq!(json["duplicateCheck"], "both");

        let defaults = ProcessingOptions::default();
        assert!(!defaults.merge_duplicates);
        assert_eq!(defaults.duplicate_check, DuplicateCheckMode::Description);
    }
}
