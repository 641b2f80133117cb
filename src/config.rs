//! Orchestrator configuration.
//!
//! Huginn does no file I/O of its own. Hosts hand configuration over in one
//! of two shapes:
//!
//! 1. Plain key-value pairs from whatever store they use
//!    ([`OrchestratorConfig::from_pairs`]):
//!
//!    ```text
//!    cache.enabled          = true
//!    cache.max_entries      = 500
//!    cache.max_age_seconds  = 600
//!    routing.policy         = latency
//!    routing.min_success_rate = 0.8
//!    ```
//!
//! 2. A TOML fragment, or any serde format, since [`OrchestratorConfig`]
//!    implements `Deserialize` with defaults for every field:
//!
//!    ```toml
//!    [cache]
//!    max_entries = 500
//!
//!    [routing]
//!    policy = "latency"
//!    ```

use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::cache::CacheConfig;
use crate::providers::{RoutingConfig, RoutingPolicy};
use crate::{HuginnError, Result};

/// Full orchestrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl OrchestratorConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a config from flat key-value pairs, starting from defaults.
    ///
    /// Unknown keys are ignored (logged at debug level) so hosts can pass
    /// their whole settings map. Malformed values are errors.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref().trim(), value.as_ref().trim());
            match key {
                "cache.enabled" => config.cache.enabled = parse_value(key, value)?,
                "cache.max_entries" => config.cache.max_entries = parse_value(key, value)?,
                "cache.max_age_seconds" => config.cache.max_age_seconds = parse_value(key, value)?,
                "routing.policy" => {
                    config.routing.policy = value
                        .parse::<RoutingPolicy>()
                        .map_err(HuginnError::Configuration)?;
                }
                "routing.min_success_rate" => {
                    config.routing.min_success_rate = parse_value(key, value)?;
                }
                other => debug!(key = other, "ignoring unknown configuration key"),
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Check all bounds.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        if !(0.0..=1.0).contains(&self.routing.min_success_rate) {
            return Err(HuginnError::Configuration(format!(
                "routing.min_success_rate must be within 0.0..=1.0, got {}",
                self.routing.min_success_rate
            )));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        HuginnError::Configuration(format!("invalid value for {key}: '{value}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = OrchestratorConfig::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 1_000);
        assert_eq!(config.cache.max_age_seconds, 3_600);
        assert_eq!(config.routing.policy, RoutingPolicy::ActiveFirst);
    }

    #[test]
    fn parse_minimal_toml() {
        let config = OrchestratorConfig::from_toml_str(
            r#"
            [cache]
            max_entries = 50
        "#,
        )
        .unwrap();
        assert_eq!(config.cache.max_entries, 50);
        // Defaults preserved
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_age_seconds, 3_600);
    }

    #[test]
    fn parse_full_toml() {
        let config = OrchestratorConfig::from_toml_str(
            r#"
            [cache]
            enabled = false
            max_entries = 10
            max_age_seconds = 30

            [routing]
            policy = "latency"
            min_success_rate = 0.9
        "#,
        )
        .unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_age_seconds, 30);
        assert_eq!(config.routing.policy, RoutingPolicy::Latency);
        assert_eq!(config.routing.min_success_rate, 0.9);
    }

    #[test]
    fn toml_rejects_zero_capacity() {
        let result = OrchestratorConfig::from_toml_str("[cache]\nmax_entries = 0\n");
        assert!(matches!(result, Err(HuginnError::Configuration(_))));
    }

    #[test]
    fn pairs_override_defaults() {
        let config = OrchestratorConfig::from_pairs([
            ("cache.enabled", "false"),
            ("cache.max_entries", "25"),
            ("cache.max_age_seconds", " 90 "),
            ("routing.policy", "latency"),
            ("ui.theme", "dark"),
        ])
        .unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_entries, 25);
        assert_eq!(config.cache.max_age_seconds, 90);
        assert_eq!(config.routing.policy, RoutingPolicy::Latency);
    }

    #[test]
    fn pairs_reject_malformed_values() {
        let err = OrchestratorConfig::from_pairs([("cache.max_entries", "lots")]).unwrap_err();
        assert!(err.to_string().contains("cache.max_entries"));

        let err = OrchestratorConfig::from_pairs([("routing.policy", "random")]).unwrap_err();
        assert!(err.to_string().contains("random"));

        let err =
            OrchestratorConfig::from_pairs([("routing.min_success_rate", "1.5")]).unwrap_err();
        assert!(matches!(err, HuginnError::Configuration(_)));
    }
}
