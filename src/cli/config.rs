//! `reco config show|set`: inspect or update the anomaly detection
//! configuration.

use crate::config::{default_config_path, ConfigDocument};
use crate::error::{ReconError, Result};

pub fn show() -> Result<()> {
    let path = default_config_path();
    let doc = ConfigDocument::load(&path).unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&doc.config)?);
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let path = default_config_path();
    let mut doc = ConfigDocument::load(&path).unwrap_or_default();

    match key {
        "amount_tolerance_percentage" => doc.config.amount_tolerance_percentage = parse_f64(value)?,
        "amount_tolerance_absolute" => doc.config.amount_tolerance_absolute = parse_f64(value)?,
        "severity_critical_threshold" => doc.config.severity_critical_threshold = parse_f64(value)?,
        "severity_high_threshold" => doc.config.severity_high_threshold = parse_f64(value)?,
        "severity_medium_threshold" => doc.config.severity_medium_threshold = parse_f64(value)?,
        "alert_on_missing_transactions" => doc.config.alert_on_missing_transactions = parse_bool(value)?,
        "alert_on_duplicate_transactions" => doc.config.alert_on_duplicate_transactions = parse_bool(value)?,
        other => return Err(ReconError::Settings(format!("unknown configuration key `{other}`"))),
    }

    doc.save(&path)?;
    println!("Set {key} = {value}");
    Ok(())
}

fn parse_f64(value: &str) -> Result<f64> {
    value.parse().map_err(|_| ReconError::Settings(format!("`{value}` is not a number")))
}

fn parse_bool(value: &str) -> Result<bool> {
    value.parse().map_err(|_| ReconError::Settings(format!("`{value}` is not true/false")))
}
