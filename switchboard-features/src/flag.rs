//! Flag values and feature sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from flag name to its value.
///
/// Used for the persisted override set and for registered defaults. A name
/// absent from the map is "unset", which is not the same as
/// `FlagValue::Boolean(false)`.
pub type FeatureSet = BTreeMap<String, FlagValue>;

/// Value a flag can hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Boolean(bool),
    Variant(String),
}

impl FlagValue {
    pub fn boolean(value: bool) -> Self {
        Self::Boolean(value)
    }

    /// Create a variant value (e.g. an experiment bucket name)
    ///
    /// # Examples
    ///
    /// ```
    /// use switchboard_features::FlagValue;
    ///
    /// let theme = FlagValue::variant("dark");
    /// assert_eq!(theme.as_variant(), Some("dark"));
    /// assert!(theme.is_truthy());
    /// ```
    pub fn variant(value: impl Into<String>) -> Self {
        Self::Variant(value.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_variant(&self) -> Option<&str> {
        match self {
            Self::Variant(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the value activates its feature.
    ///
    /// Only `Boolean(false)` is inactive; every variant counts as active.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Boolean(false))
    }
}

impl Default for FlagValue {
    fn default() -> Self {
        Self::Boolean(false)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Variant(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::Variant(value)
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Variant(v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_value() {
        let value = FlagValue::boolean(true);
        assert_eq!(value.as_bool(), Some(true));
        assert_eq!(value.as_variant(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(FlagValue::Boolean(true).is_truthy());
        assert!(!FlagValue::Boolean(false).is_truthy());
        assert!(FlagValue::variant("control").is_truthy());
        assert!(!FlagValue::default().is_truthy());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(FlagValue::from(false), FlagValue::Boolean(false));
        assert_eq!(FlagValue::from("dark"), FlagValue::variant("dark"));
        assert_eq!(FlagValue::from("dark".to_string()).to_string(), "dark");
        assert_eq!(FlagValue::Boolean(true).to_string(), "true");
    }

    #[test]
    fn test_untagged_serde() {
        let set: FeatureSet = serde_json::from_str(r#"{"beta": true, "theme": "dark"}"#).unwrap();
        assert_eq!(set.get("beta"), Some(&FlagValue::Boolean(true)));
        assert_eq!(set.get("theme"), Some(&FlagValue::variant("dark")));
    }
}
