//! Feature store configuration.
//!
//! Configuration can be built in code, read from `<PREFIX>_*` environment
//! variables, or deserialized from TOML.
//!
//! ```
//! use switchboard_features::FeaturesConfig;
//!
//! let config = FeaturesConfig::from_toml_str(r#"key = "flags""#).unwrap();
//! assert_eq!(config.key, "flags");
//! assert_eq!(config.degraded_key(), "_flags");
//! assert_eq!(config.fallback_key(), "flags");
//! ```

use crate::codec;
use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default persistence key.
pub const DEFAULT_KEY: &str = "features";

/// Default prefix prepended to the key on the degraded storage path.
pub const DEFAULT_DEGRADED_PREFIX: &str = "_";

/// Configuration for a [`Features`](crate::Features) instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Key the override set is persisted under
    pub key: String,

    /// Key passed to the fallback source (defaults to `key`)
    pub fallback_key: Option<String>,

    /// Prefix for the key used when primary storage is unsupported
    pub degraded_prefix: String,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            fallback_key: None,
            degraded_prefix: DEFAULT_DEGRADED_PREFIX.to_string(),
        }
    }
}

impl FeaturesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_fallback_key(mut self, key: impl Into<String>) -> Self {
        self.fallback_key = Some(key.into());
        self
    }

    pub fn with_degraded_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.degraded_prefix = prefix.into();
        self
    }

    pub fn fallback_key(&self) -> &str {
        self.fallback_key.as_deref().unwrap_or(&self.key)
    }

    pub fn degraded_key(&self) -> String {
        format!("{}{}", self.degraded_prefix, self.key)
    }

    /// Load overrides from `<PREFIX>_KEY`, `<PREFIX>_FALLBACK_KEY` and
    /// `<PREFIX>_DEGRADED_PREFIX`, starting from the defaults.
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub(crate) fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", prefix, name));
        let mut config = Self::default();

        if let Some(key) = var("KEY") {
            config.key = key;
        }
        if let Some(fallback_key) = var("FALLBACK_KEY") {
            config.fallback_key = Some(fallback_key);
        }
        if let Some(degraded_prefix) = var("DEGRADED_PREFIX") {
            config.degraded_prefix = degraded_prefix;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| FeatureError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(FeatureError::Config("key must not be empty".to_string()));
        }
        if !codec::is_valid_name(&self.key) {
            return Err(FeatureError::Config(format!(
                "key {:?} contains reserved characters",
                self.key
            )));
        }
        if self.degraded_prefix.is_empty() {
            return Err(FeatureError::Config(
                "degraded_prefix must not be empty".to_string(),
            ));
        }
        if self.fallback_key.as_deref() == Some("") {
            return Err(FeatureError::Config(
                "fallback_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FeaturesConfig::default();
        assert_eq!(config.key, "features");
        assert_eq!(config.fallback_key(), "features");
        assert_eq!(config.degraded_key(), "_features");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = FeaturesConfig::new()
            .with_key("flags")
            .with_fallback_key("server_flags")
            .with_degraded_prefix("fallback_");

        assert_eq!(config.fallback_key(), "server_flags");
        assert_eq!(config.degraded_key(), "fallback_flags");
    }

    #[test]
    fn test_toml_partial() {
        let config = FeaturesConfig::from_toml_str("fallback_key = \"srv\"\n").unwrap();
        assert_eq!(config.key, "features");
        assert_eq!(config.fallback_key(), "srv");
    }

    #[test]
    fn test_toml_invalid() {
        assert!(matches!(
            FeaturesConfig::from_toml_str("key = 42"),
            Err(FeatureError::Config(_))
        ));
        assert!(FeaturesConfig::from_toml_str("key = \"\"").is_err());
        assert!(FeaturesConfig::from_toml_str("key = \"a*b\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.toml");
        std::fs::write(&path, "key = \"flags\"\ndegraded_prefix = \"~\"\n").unwrap();

        let config = FeaturesConfig::from_file(&path).unwrap();
        assert_eq!(config.degraded_key(), "~flags");

        assert!(matches!(
            FeaturesConfig::from_file(dir.path().join("missing.toml")),
            Err(FeatureError::Io(_))
        ));
    }

    #[test]
    fn test_from_env_defaults_when_unset() {
        let config = FeaturesConfig::from_env("SWITCHBOARD_CONFIG_TEST_UNSET_12345").unwrap();
        assert_eq!(config, FeaturesConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_prefixed_vars() {
        let vars = HashMap::from([
            ("APP_KEY", "env_flags"),
            ("APP_FALLBACK_KEY", "signal"),
            ("APP_DEGRADED_PREFIX", "~"),
            ("OTHER_KEY", "ignored"),
        ]);

        let config =
            FeaturesConfig::from_lookup("APP", |name| vars.get(name).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(config.key, "env_flags");
        assert_eq!(config.fallback_key(), "signal");
        assert_eq!(config.degraded_key(), "~env_flags");
    }

    #[test]
    fn test_from_lookup_validates() {
        let result = FeaturesConfig::from_lookup("APP", |name| {
            (name == "APP_KEY").then(|| "a|b".to_string())
        });
        assert!(matches!(result, Err(FeatureError::Config(_))));
    }
}
