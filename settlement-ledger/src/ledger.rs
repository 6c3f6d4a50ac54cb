//! Interbank ledger with opposite-balance settlement
//!
//! Records gross value flows between banks and keeps only the net debt per
//! pair of banks.
//!
//! # Algorithm
//!
//! When `from` sends `amount` to `to`:
//!
//! 1. Look up what `to` already owes `from` (the opposite balance)
//! 2. If the transfer covers it, drop that debt and carry the remainder forward
//! 3. Otherwise shrink the opposite debt and stop
//! 4. Add whatever is left to what `from` owes `to`
//!
//! ```text
//! owed[B][A] = 40
//! record(A → B, 100)
//!   opposite 40 cancelled, 60 carried forward
//! owed[A][B] = 60, owed[B][A] removed
//! ```
//!
//! Settled entries are deleted rather than stored as zero, and a debtor with
//! no remaining creditors disappears from the map entirely.

use crate::{
    config::LedgerConfig,
    metrics::LedgerMetrics,
    source::BalanceSource,
    types::*,
    Error, InvalidTransfer, Result,
};
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Interbank settlement ledger
///
/// All operations take `&self`; state is guarded by a single lock so the
/// ledger can be shared behind an `Arc`.
pub struct InterbankLedger {
    /// Debtor → creditor → owed amount
    balances: RwLock<Balances>,

    /// Where actual bank balances come from
    source: Box<dyn BalanceSource>,

    /// Configuration
    config: LedgerConfig,

    /// Metrics collector (if enabled)
    metrics: Option<LedgerMetrics>,
}

impl std::fmt::Debug for InterbankLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterbankLedger")
            .field("debtors", &self.balances.read().len())
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl InterbankLedger {
    /// Create ledger with default amount scale and no metrics
    pub fn new(source: impl BalanceSource + 'static) -> Self {
        let config = LedgerConfig {
            metrics_enabled: false,
            ..LedgerConfig::default()
        };

        tracing::info!(
            service = %config.service_name,
            amount_scale = config.amount_scale,
            metrics = false,
            "Interbank ledger created"
        );

        Self {
            balances: RwLock::new(Balances::new()),
            source: Box::new(source),
            config,
            metrics: None,
        }
    }

    /// Create ledger from configuration
    pub fn with_config(source: impl BalanceSource + 'static, config: LedgerConfig) -> Result<Self> {
        config.validate()?;

        let metrics = if config.metrics_enabled {
            Some(LedgerMetrics::new()?)
        } else {
            None
        };

        tracing::info!(
            service = %config.service_name,
            amount_scale = config.amount_scale,
            metrics = config.metrics_enabled,
            "Interbank ledger created"
        );

        Ok(Self {
            balances: RwLock::new(Balances::new()),
            source: Box::new(source),
            config,
            metrics,
        })
    }

    /// Attach a metrics collector
    ///
    /// The open-positions gauge is seeded from the current state and updated
    /// incrementally from then on.
    pub fn with_metrics(mut self, metrics: LedgerMetrics) -> Self {
        metrics.open_positions.set(count_positions(&self.balances.read()) as i64);
        self.config.metrics_enabled = true;
        self.metrics = Some(metrics);
        self
    }

    /// Get configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Get metrics collector
    pub fn metrics(&self) -> Option<&LedgerMetrics> {
        self.metrics.as_ref()
    }

    /// Record value moving from one bank to another
    ///
    /// The amount is rounded to the configured scale first. Same-bank and
    /// non-positive transfers are refused without touching any state, as are
    /// transfers whose resulting debt would overflow.
    pub fn record_transfer(
        &self,
        from_bank: BankId,
        to_bank: BankId,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        let amount = amount.round_dp(self.config.amount_scale);

        if let Err(reason) = validate_transfer(from_bank, to_bank, amount) {
            return Err(self.reject(from_bank, to_bank, amount, reason));
        }

        let applied = apply_transfer(&mut self.balances.write(), from_bank, to_bank, amount);
        let settlement = match applied {
            Ok(settlement) => settlement,
            Err(reason) => return Err(self.reject(from_bank, to_bank, amount, reason)),
        };

        let receipt = TransferReceipt {
            transfer_id: Uuid::new_v4(),
            from_bank,
            to_bank,
            amount,
            offset: settlement.offset,
            carried_forward: amount - settlement.offset,
            recorded_at: Utc::now(),
        };

        tracing::debug!(
            transfer_id = %receipt.transfer_id,
            %from_bank,
            %to_bank,
            %amount,
            offset = %receipt.offset,
            carried_forward = %receipt.carried_forward,
            "Recorded interbank transfer"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_transfer(settlement.offset > Decimal::ZERO, settlement.position_delta);
        }

        Ok(receipt)
    }

    fn reject(&self, from_bank: BankId, to_bank: BankId, amount: Decimal, reason: InvalidTransfer) -> Error {
        tracing::warn!(%from_bank, %to_bank, %amount, "Rejected interbank transfer: {}", reason);
        if let Some(metrics) = &self.metrics {
            metrics.record_rejection();
        }
        reason.into()
    }

    /// What `from_bank` currently owes `to_bank` (zero if nothing)
    pub fn owed_amount(&self, from_bank: BankId, to_bank: BankId) -> Decimal {
        self.balances
            .read()
            .get(&from_bank)
            .and_then(|creditors| creditors.get(&to_bank))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Independent copy of every outstanding debt
    pub fn all_balances(&self) -> Balances {
        self.balances.read().clone()
    }

    /// Check if no debt is outstanding
    pub fn is_empty(&self) -> bool {
        self.balances.read().is_empty()
    }

    /// Banks on either side of an outstanding debt, in ascending order
    pub fn banks(&self) -> Vec<BankId> {
        let balances = self.balances.read();
        let mut banks = BTreeSet::new();
        for (debtor, creditors) in balances.iter() {
            banks.insert(*debtor);
            banks.extend(creditors.keys().copied());
        }
        banks.into_iter().collect()
    }

    /// Net settlement position of a bank
    ///
    /// Fails with [`Error::BalanceRetrieval`] when the balance source cannot
    /// report the bank's actual balance.
    pub fn net_bank_position(&self, bank_id: BankId) -> Result<NetPosition> {
        let totals = {
            let balances = self.balances.read();
            sum_owed(&balances, bank_id).zip(sum_receivable(&balances, bank_id))
        };
        let (total_owed, total_receivable) =
            totals.ok_or_else(|| self.position_overflow(bank_id))?;

        // Lock released: the source may be slow or call back into the ledger
        let actual_balance = self
            .source
            .bank_total_balance(bank_id)
            .map_err(|source| {
                tracing::warn!(bank = %bank_id, "Balance lookup failed: {:#}", source);
                if let Some(metrics) = &self.metrics {
                    metrics.record_lookup_failure();
                }
                Error::BalanceRetrieval {
                    bank: bank_id,
                    source,
                }
            })?;

        let position = NetPosition {
            bank_id,
            actual_balance,
            total_receivable,
            total_owed,
        };

        // Settlement score must be computable without overflow
        actual_balance
            .checked_add(position.net_exposure())
            .ok_or_else(|| self.position_overflow(bank_id))?;

        Ok(position)
    }

    fn position_overflow(&self, bank_id: BankId) -> Error {
        tracing::warn!(bank = %bank_id, "Net position exceeds the representable range");
        Error::PositionOverflow { bank: bank_id }
    }

    /// Net positions of every bank returned by [`banks`](Self::banks)
    pub fn net_positions(&self) -> Result<Vec<NetPosition>> {
        self.banks()
            .into_iter()
            .map(|bank| self.net_bank_position(bank))
            .collect()
    }
}

fn validate_transfer(
    from_bank: BankId,
    to_bank: BankId,
    amount: Decimal,
) -> std::result::Result<(), InvalidTransfer> {
    if from_bank == to_bank {
        return Err(InvalidTransfer::SameBank { bank: from_bank });
    }
    if amount <= Decimal::ZERO {
        return Err(InvalidTransfer::NonPositiveAmount { amount });
    }
    Ok(())
}

/// Effect of a transfer on the ledger
#[derive(Debug, Clone, Copy)]
struct Settlement {
    /// Portion of the amount absorbed by the opposite balance
    offset: Decimal,

    /// Change in the number of outstanding directional debts
    position_delta: i64,
}

/// Apply a validated transfer.
///
/// The forward debt is computed before anything is mutated, so an overflow
/// leaves `balances` untouched.
fn apply_transfer(
    balances: &mut Balances,
    from_bank: BankId,
    to_bank: BankId,
    amount: Decimal,
) -> std::result::Result<Settlement, InvalidTransfer> {
    let opposite = owed_in(balances, to_bank, from_bank);
    let offset = opposite.min(amount);
    let existing = owed_in(balances, from_bank, to_bank);
    let forward = existing
        .checked_add(amount - offset)
        .ok_or(InvalidTransfer::AmountOverflow { from_bank, to_bank })?;

    let mut position_delta = 0;
    if offset > Decimal::ZERO && settle_opposite_balance(balances, from_bank, to_bank, offset) {
        position_delta -= 1;
    }
    if forward > existing {
        if existing == Decimal::ZERO {
            position_delta += 1;
        }
        balances.entry(from_bank).or_default().insert(to_bank, forward);
    }

    Ok(Settlement {
        offset,
        position_delta,
    })
}

fn owed_in(balances: &Balances, debtor: BankId, creditor: BankId) -> Decimal {
    balances
        .get(&debtor)
        .and_then(|creditors| creditors.get(&creditor))
        .copied()
        .filter(|owed| *owed > Decimal::ZERO)
        .unwrap_or(Decimal::ZERO)
}

/// Cancel `offset` of the debt `to_bank` owes `from_bank`.
///
/// Returns true when the debt was settled in full and removed.
fn settle_opposite_balance(
    balances: &mut Balances,
    from_bank: BankId,
    to_bank: BankId,
    offset: Decimal,
) -> bool {
    let Some(creditors) = balances.get_mut(&to_bank) else {
        return false;
    };
    let Some(owed) = creditors.get_mut(&from_bank) else {
        return false;
    };

    *owed -= offset;
    if *owed > Decimal::ZERO {
        return false;
    }

    creditors.remove(&from_bank);
    if creditors.is_empty() {
        balances.remove(&to_bank);
    }
    true
}

fn count_positions(balances: &Balances) -> usize {
    balances.values().map(|creditors| creditors.len()).sum()
}

fn sum_owed(balances: &Balances, bank_id: BankId) -> Option<Decimal> {
    balances.get(&bank_id).map_or(Some(Decimal::ZERO), |creditors| {
        creditors
            .values()
            .try_fold(Decimal::ZERO, |total, owed| total.checked_add(*owed))
    })
}

fn sum_receivable(balances: &Balances, bank_id: BankId) -> Option<Decimal> {
    balances
        .iter()
        .filter(|(debtor, _)| **debtor != bank_id)
        .filter_map(|(_, creditors)| creditors.get(&bank_id))
        .try_fold(Decimal::ZERO, |total, owed| total.checked_add(*owed))
}
