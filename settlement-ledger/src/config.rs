//! Configuration for the settlement ledger

use serde::{Deserialize, Serialize};

/// Largest scale a `Decimal` can carry
const MAX_AMOUNT_SCALE: u32 = 28;

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Service name
    pub service_name: String,

    /// Decimal places recorded amounts are rounded to
    pub amount_scale: u32,

    /// Collect Prometheus metrics
    pub metrics_enabled: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            service_name: "settlement-ledger".to_string(),
            amount_scale: 2, // cents
            metrics_enabled: true,
        }
    }
}

impl LedgerConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LedgerConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = LedgerConfig::default();

        if let Ok(name) = std::env::var("LEDGER_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Ok(scale) = std::env::var("LEDGER_AMOUNT_SCALE") {
            config.amount_scale = scale.parse().map_err(|e| {
                crate::Error::Config(format!("LEDGER_AMOUNT_SCALE '{}': {}", scale, e))
            })?;
        }

        if let Ok(enabled) = std::env::var("LEDGER_METRICS_ENABLED") {
            config.metrics_enabled = enabled.parse().map_err(|e| {
                crate::Error::Config(format!("LEDGER_METRICS_ENABLED '{}': {}", enabled, e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> crate::Result<()> {
        if self.amount_scale > MAX_AMOUNT_SCALE {
            return Err(crate::Error::Config(format!(
                "amount_scale {} exceeds maximum {}",
                self.amount_scale, MAX_AMOUNT_SCALE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.service_name, "settlement-ledger");
        assert_eq!(config.amount_scale, 2);
        assert!(config.metrics_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "amount_scale = 4").unwrap();

        let config = LedgerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.amount_scale, 4);
        assert_eq!(config.service_name, "settlement-ledger");
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_from_file_rejects_bad_scale() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "amount_scale = 40").unwrap();

        let err = LedgerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_from_file_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "amount_scale = \"two\"").unwrap();

        assert!(matches!(
            LedgerConfig::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));
    }
}
