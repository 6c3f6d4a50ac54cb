//! Balance source seam
//!
//! The ledger never tracks cash itself. Whatever owns the accounts (an
//! in-memory book, a database, a remote core-banking system) implements
//! [`BalanceSource`] and is handed to the ledger at construction time.

use crate::types::BankId;
use anyhow::anyhow;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Reports the total on-ledger account balance held at a bank
pub trait BalanceSource: Send + Sync {
    /// Total balance of all active accounts at `bank`
    fn bank_total_balance(&self, bank: BankId) -> anyhow::Result<Decimal>;
}

impl<F> BalanceSource for F
where
    F: Fn(BankId) -> anyhow::Result<Decimal> + Send + Sync,
{
    fn bank_total_balance(&self, bank: BankId) -> anyhow::Result<Decimal> {
        self(bank)
    }
}

/// Fixed per-bank balances
///
/// Banks that were never given a balance are reported as unknown rather than
/// as holding zero.
#[derive(Debug, Clone, Default)]
pub struct StaticBalances {
    balances: HashMap<BankId, Decimal>,
}

impl StaticBalances {
    /// Create empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a bank's balance (builder style)
    pub fn with_balance(mut self, bank: BankId, balance: Decimal) -> Self {
        self.balances.insert(bank, balance);
        self
    }
}

impl FromIterator<(BankId, Decimal)> for StaticBalances {
    fn from_iter<I: IntoIterator<Item = (BankId, Decimal)>>(iter: I) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}

impl BalanceSource for StaticBalances {
    fn bank_total_balance(&self, bank: BankId) -> anyhow::Result<Decimal> {
        self.balances
            .get(&bank)
            .copied()
            .ok_or_else(|| anyhow!("no balance known for bank {}", bank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_static_balances() {
        let source = StaticBalances::new()
            .with_balance(BankId::new(1), dec!(1200.50))
            .with_balance(BankId::new(2), dec!(0));

        assert_eq!(source.bank_total_balance(BankId::new(1)).unwrap(), dec!(1200.50));
        assert_eq!(source.bank_total_balance(BankId::new(2)).unwrap(), dec!(0));
        assert!(source.bank_total_balance(BankId::new(3)).is_err());
    }

    #[test]
    fn test_closure_source() {
        let source = |bank: BankId| -> anyhow::Result<Decimal> { Ok(Decimal::from(bank.get() * 100)) };
        assert_eq!(source.bank_total_balance(BankId::new(4)).unwrap(), dec!(400));
    }
}
