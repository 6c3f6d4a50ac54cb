//! Core types for the settlement ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Bank identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankId(u64);

impl BankId {
    /// Create new bank ID
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for BankId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Debtor → creditor → owed amount
pub type Balances = HashMap<BankId, HashMap<BankId, Decimal>>;

/// Outcome of a recorded transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Transfer ID
    pub transfer_id: Uuid,

    /// Bank the value left
    pub from_bank: BankId,

    /// Bank the value reached
    pub to_bank: BankId,

    /// Recorded amount (after rounding to the ledger scale)
    pub amount: Decimal,

    /// Portion that cancelled debt `to_bank` already owed `from_bank`
    pub offset: Decimal,

    /// Portion added to what `from_bank` owes `to_bank`
    pub carried_forward: Decimal,

    /// Recorded timestamp
    pub recorded_at: DateTime<Utc>,
}

impl TransferReceipt {
    /// Check if the transfer was entirely absorbed by an opposing debt
    pub fn fully_offset(&self) -> bool {
        self.carried_forward == Decimal::ZERO
    }
}

/// Net settlement position of a single bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPosition {
    /// Bank ID
    pub bank_id: BankId,

    /// Balance reported by the balance source
    pub actual_balance: Decimal,

    /// Total owed to this bank by others
    pub total_receivable: Decimal,

    /// Total this bank owes others
    pub total_owed: Decimal,
}

impl NetPosition {
    /// Receivables minus payables
    pub fn net_exposure(&self) -> Decimal {
        self.total_receivable - self.total_owed
    }

    /// Actual balance adjusted by net interbank exposure.
    ///
    /// A negative score means the bank cannot cover what it owes the network.
    pub fn settlement_score(&self) -> Decimal {
        self.actual_balance + self.net_exposure()
    }

    /// Check if net payer (owes more than it is owed)
    pub fn is_net_payer(&self) -> bool {
        self.net_exposure() < Decimal::ZERO
    }

    /// Check if net receiver
    pub fn is_net_receiver(&self) -> bool {
        self.net_exposure() > Decimal::ZERO
    }
}
