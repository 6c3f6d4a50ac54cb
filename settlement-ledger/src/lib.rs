//! Interbank Settlement Ledger
//!
//! Tracks bilateral debt between banks and reports each bank's net settlement
//! position across the interbank network.
//!
//! # Architecture
//!
//! Value flows are recorded as they happen (typically when an admin transfer
//! moves money between accounts held at different banks). Opposing flows are
//! netted on the spot, so for any pair of banks the ledger holds at most one
//! directional debt:
//!
//! ```text
//! record(A → B, 100)    owed[A][B] = 100
//! record(B → A,  40)    owed[A][B] =  60
//! record(B → A, 100)    owed[B][A] =  40
//! ```
//!
//! A bank's actual cash is not tracked here. It is read through an injected
//! [`BalanceSource`] whenever a net position is requested.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use settlement_ledger::{BankId, InterbankLedger};
//!
//! # fn main() -> settlement_ledger::Result<()> {
//! let source = |_bank: BankId| -> anyhow::Result<Decimal> { Ok(Decimal::new(1000, 0)) };
//! let ledger = InterbankLedger::new(source);
//!
//! ledger.record_transfer(BankId::new(1), BankId::new(2), Decimal::new(300, 0))?;
//! ledger.record_transfer(BankId::new(2), BankId::new(1), Decimal::new(100, 0))?;
//!
//! assert_eq!(ledger.owed_amount(BankId::new(1), BankId::new(2)), Decimal::new(200, 0));
//!
//! let position = ledger.net_bank_position(BankId::new(2))?;
//! assert_eq!(position.total_receivable, Decimal::new(200, 0));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod ledger;
pub mod source;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, InvalidTransfer, Result};
pub use types::*;
pub use config::LedgerConfig;
pub use ledger::InterbankLedger;
pub use metrics::LedgerMetrics;
pub use source::{BalanceSource, StaticBalances};
