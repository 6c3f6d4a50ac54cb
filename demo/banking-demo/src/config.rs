use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use settlement_ledger::LedgerConfig;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Balance every new account starts with
    pub opening_balance: Decimal,
    pub ledger: LedgerConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            opening_balance: Decimal::new(1000, 0),
            ledger: LedgerConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Read `BANKING_DEMO_CONFIG` if set, otherwise defaults with ledger env overrides
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("BANKING_DEMO_CONFIG") {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self {
                ledger: LedgerConfig::from_env()?,
                ..Self::default()
            }),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: DemoConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.opening_balance < Decimal::ZERO {
            anyhow::bail!("opening_balance cannot be negative");
        }
        self.ledger.validate()?;
        Ok(())
    }
}
