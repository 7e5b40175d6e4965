//! Anomaly detection configuration (A2): severity thresholds, amount
//! tolerances, and feature flags, loaded from and saved to JSON the same way
//! the reference crate's `Settings` round-trips its own config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::store::atomic_write;

fn default_amount_tolerance_percentage() -> f64 {
    0.01
}

fn default_amount_tolerance_absolute() -> f64 {
    1.00
}

fn default_severity_critical_threshold() -> f64 {
    1000.0
}

fn default_severity_high_threshold() -> f64 {
    500.0
}

fn default_severity_medium_threshold() -> f64 {
    100.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    #[serde(default = "default_amount_tolerance_percentage")]
    pub amount_tolerance_percentage: f64,
    #[serde(default = "default_amount_tolerance_absolute")]
    pub amount_tolerance_absolute: f64,
    #[serde(default = "default_severity_critical_threshold")]
    pub severity_critical_threshold: f64,
    #[serde(default = "default_severity_high_threshold")]
    pub severity_high_threshold: f64,
    #[serde(default = "default_severity_medium_threshold")]
    pub severity_medium_threshold: f64,
    #[serde(default = "default_true")]
    pub alert_on_missing_transactions: bool,
    #[serde(default = "default_true")]
    pub alert_on_duplicate_transactions: bool,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        AnomalyConfig {
            amount_tolerance_percentage: default_amount_tolerance_percentage(),
            amount_tolerance_absolute: default_amount_tolerance_absolute(),
            severity_critical_threshold: default_severity_critical_threshold(),
            severity_high_threshold: default_severity_high_threshold(),
            severity_medium_threshold: default_severity_medium_threshold(),
            alert_on_missing_transactions: default_true(),
            alert_on_duplicate_transactions: default_true(),
        }
    }
}

impl AnomalyConfig {
    pub fn amount_tolerance(&self, max_amount: f64) -> f64 {
        f64::max(self.amount_tolerance_absolute, self.amount_tolerance_percentage * max_amount)
    }
}

const KNOWN_KEYS: &[&str] = &[
    "amount_tolerance_percentage",
    "amount_tolerance_absolute",
    "severity_critical_threshold",
    "severity_high_threshold",
    "severity_medium_threshold",
    "alert_on_missing_transactions",
    "alert_on_duplicate_transactions",
];

/// The config file as a whole: the typed fields this crate owns, plus
/// whatever else was present on disk, so a newer writer's extra keys survive
/// a load→save cycle performed by an older one.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    pub config: AnomalyConfig,
    extra: serde_json::Map<String, Value>,
}

impl ConfigDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let raw: Value = serde_json::from_str(&text)?;
        let config: AnomalyConfig = serde_json::from_value(raw.clone())?;
        let mut extra = raw.as_object().cloned().unwrap_or_default();
        for key in KNOWN_KEYS {
            extra.remove(*key);
        }
        Ok(ConfigDocument { config, extra })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut map = self.extra.clone();
        if let Value::Object(typed) = serde_json::to_value(&self.config)? {
            map.extend(typed);
        }
        atomic_write(path, serde_json::to_vec_pretty(&map)?.as_slice())
    }
}

impl Default for ConfigDocument {
    fn default() -> Self {
        ConfigDocument {
            config: AnomalyConfig::default(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Default config file location, mirroring the reference crate's use of a
/// per-user directory rather than the crate's own working directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(std::env::temp_dir).join("ledger-recon").join("anomaly_config.json")
}

/// Load the anomaly configuration from the default path, falling back to
/// defaults when no config file has been written yet or it fails to parse.
pub fn load_or_default() -> AnomalyConfig {
    ConfigDocument::load(&default_config_path()).map(|doc| doc.config).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = AnomalyConfig::default();
        assert_eq!(config.amount_tolerance_percentage, 0.01);
        assert_eq!(config.amount_tolerance_absolute, 1.00);
        assert!(config.alert_on_missing_transactions);
    }

    #[test]
    fn round_trip_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anomaly_config.json");
        let mut doc = ConfigDocument::default();
        doc.config.amount_tolerance_absolute = 5.0;
        doc.save(&path).unwrap();
        let loaded = ConfigDocument::load(&path).unwrap();
        assert_eq!(loaded.config, doc.config);
    }

    #[test]
    fn config_missing_newly_added_fields_still_loads_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anomaly_config.json");
        std::fs::write(&path, r#"{"amount_tolerance_absolute": 2.5}"#).unwrap();
        let loaded = ConfigDocument::load(&path).unwrap();
        assert_eq!(loaded.config.amount_tolerance_absolute, 2.5);
        assert_eq!(loaded.config.amount_tolerance_percentage, 0.01);
    }

    #[test]
    fn unknown_keys_survive_a_load_then_save_cycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anomaly_config.json");
        std::fs::write(&path, r#"{"amount_tolerance_absolute": 2.5, "future_flag": true}"#).unwrap();
        let loaded = ConfigDocument::load(&path).unwrap();
        loaded.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.get("future_flag"), Some(&Value::Bool(true)));
    }

    #[test]
    fn amount_tolerance_takes_the_larger_of_absolute_and_percentage() {
        let config = AnomalyConfig::default();
        assert_eq!(config.amount_tolerance(100.0), 1.00);
        assert_eq!(config.amount_tolerance(1_000_000.0), 10_000.0);
    }
}
