//! Business modes partitioning the catalog.

use serde::{Deserialize, Serialize};

/// Error returned when a mode string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid mode: {0} (expected `wholesale` or `retail`)")]
pub struct ModeError(pub String);

/// Catalog partition: wholesale (B2B) or retail (B2C).
///
/// Each mode has its own categories, subcategories and products. The Catalog
/// Store takes the mode as a `?mode=` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Wholesale,
    Retail,
}

impl Mode {
    /// Value used for the `mode` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wholesale => "wholesale",
            Self::Retail => "retail",
        }
    }

    /// Resolve a mode from an entity's `isRetail` / `isWholesale` flags.
    ///
    /// Returns `None` when both or neither flag is set, since the flags are
    /// only mutually exclusive by convention.
    #[must_use]
    pub const fn from_flags(is_retail: bool, is_wholesale: bool) -> Option<Self> {
        match (is_retail, is_wholesale) {
            (true, false) => Some(Self::Retail),
            (false, true) => Some(Self::Wholesale),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wholesale" | "b2b" => Ok(Self::Wholesale),
            "retail" | "b2c" => Ok(Self::Retail),
            _ => Err(ModeError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!("retail".parse::<Mode>(), Ok(Mode::Retail));
        assert_eq!(" Wholesale ".parse::<Mode>(), Ok(Mode::Wholesale));
        assert_eq!(Mode::Retail.to_string(), "retail");
        assert!("grocery".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(Mode::from_flags(true, false), Some(Mode::Retail));
        assert_eq!(Mode::from_flags(false, true), Some(Mode::Wholesale));
        assert_eq!(Mode::from_flags(true, true), None);
        assert_eq!(Mode::from_flags(false, false), None);
    }
}
