//! Settings read from the environment (and `.env`).
//!
//! - SETTLEMENT_SNAPSHOT=path (default: cache/ledger.json)
//! - SETTLEMENT_PARALLEL=1 settles games concurrently (default: 0)
//! - SETTLEMENT_UNIT_VALUE=dollars per unit (default: inferred from picks)
//! - RUST_LOG=level (default: info)

use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_SNAPSHOT_PATH: &str = "cache/ledger.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub parallel: bool,
    pub unit_value: Option<f64>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            parallel: false,
            unit_value: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup("SETTLEMENT_SNAPSHOT").filter(|s| !s.trim().is_empty()) {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("SETTLEMENT_PARALLEL") {
            config.parallel = parse_flag("SETTLEMENT_PARALLEL", &value)?;
        }
        if let Some(value) = lookup("SETTLEMENT_UNIT_VALUE").filter(|s| !s.trim().is_empty()) {
            let unit = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(|| invalid("SETTLEMENT_UNIT_VALUE", &value))?;
            config.unit_value = Some(unit);
        }
        if let Some(filter) = lookup("RUST_LOG").filter(|s| !s.trim().is_empty()) {
            config.log_filter = filter;
        }
        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.snapshot_path, PathBuf::from("cache/ledger.json"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SETTLEMENT_SNAPSHOT", "/tmp/ledger.json"),
            ("SETTLEMENT_PARALLEL", "1"),
            ("SETTLEMENT_UNIT_VALUE", "25"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/ledger.json"));
        assert!(config.parallel);
        assert_eq!(config.unit_value, Some(25.0));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            Config::from_lookup(lookup(&[("SETTLEMENT_PARALLEL", "sometimes")])),
            Err(ConfigError::Invalid {
                key: "SETTLEMENT_PARALLEL".to_string(),
                value: "sometimes".to_string()
            })
        );
        assert!(Config::from_lookup(lookup(&[("SETTLEMENT_UNIT_VALUE", "-5")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SETTLEMENT_UNIT_VALUE", "ten")])).is_err());
    }
}
