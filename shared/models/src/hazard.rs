//! Categorical hazard values produced by the field extractor.

use std::fmt;

/// Whether the sheet calls out a static-discharge hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticHazard {
    Yes,
    No,
}

impl StaticHazard {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl fmt::Display for StaticHazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flammable (explosive) limits by volume, or an explicit statement that
/// the substance does not burn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flammability {
    Range { lel: String, uel: String },
    LowerOnly(String),
    UpperOnly(String),
    NonFlammable,
}

impl Flammability {
    pub const NON_FLAMMABLE: &'static str = "Non-flammable";

    /// Combines independently found limits; `None` when neither was found
    pub fn from_limits(lel: Option<String>, uel: Option<String>) -> Option<Self> {
        match (lel, uel) {
            (Some(lel), Some(uel)) => Some(Self::Range { lel, uel }),
            (Some(lel), None) => Some(Self::LowerOnly(lel)),
            (None, Some(uel)) => Some(Self::UpperOnly(uel)),
            (None, None) => None,
        }
    }
}

impl fmt::Display for Flammability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { lel, uel } => write!(f, "LEL: {}%, UEL: {}%", lel, uel),
            Self::LowerOnly(lel) => write!(f, "LEL: {}%", lel),
            Self::UpperOnly(uel) => write!(f, "UEL: {}%", uel),
            Self::NonFlammable => f.write_str(Self::NON_FLAMMABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flammability_rendering() {
        let range = Flammability::from_limits(Some("2.1".into()), Some("12.8".into())).unwrap();
        assert_eq!(range.to_string(), "LEL: 2.1%, UEL: 12.8%");

        let lower = Flammability::from_limits(Some("3.3".into()), None).unwrap();
        assert_eq!(lower.to_string(), "LEL: 3.3%");

        let upper = Flammability::from_limits(None, Some("19".into())).unwrap();
        assert_eq!(upper.to_string(), "UEL: 19%");

        assert!(Flammability::from_limits(None, None).is_none());
        assert_eq!(Flammability::NonFlammable.to_string(), "Non-flammable");
    }

    #[test]
    fn test_static_hazard_tokens() {
        assert_eq!(StaticHazard::Yes.to_string(), "Yes");
        assert_eq!(StaticHazard::No.to_string(), "No");
    }
}
