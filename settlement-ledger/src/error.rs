//! Error types for the settlement ledger

use crate::types::BankId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Transfer rejected before touching ledger state
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(#[from] InvalidTransfer),

    /// The injected balance source could not report a bank's balance
    #[error("balance retrieval failed for bank {bank}: {source}")]
    BalanceRetrieval {
        /// Bank whose balance was requested
        bank: BankId,
        /// Underlying failure, kept opaque
        #[source]
        source: anyhow::Error,
    },

    /// A bank's interbank totals no longer fit in a decimal
    #[error("net position of bank {bank} exceeds the representable range")]
    PositionOverflow {
        /// Bank whose position was requested
        bank: BankId,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error came from transfer validation.
    ///
    /// Callers use this to skip ledger recording for transfers that never
    /// cross a bank boundary.
    pub fn is_invalid_transfer(&self) -> bool {
        matches!(self, Error::InvalidTransfer(_))
    }
}

/// Reasons a transfer is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTransfer {
    /// Debtor and creditor are the same bank
    #[error("bank {bank} cannot owe itself")]
    SameBank {
        /// The bank on both sides
        bank: BankId,
    },

    /// Amount is zero or negative (after rounding to the ledger scale)
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Adding the amount to the existing debt would overflow
    #[error("debt from bank {from_bank} to bank {to_bank} would exceed the representable range")]
    AmountOverflow {
        /// Debtor bank
        from_bank: BankId,
        /// Creditor bank
        to_bank: BankId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transfer_is_detectable() {
        let err: Error = InvalidTransfer::SameBank { bank: BankId::new(7) }.into();
        assert!(err.is_invalid_transfer());
        assert_eq!(err.to_string(), "Invalid transfer: bank 7 cannot owe itself");
    }

    #[test]
    fn test_balance_retrieval_keeps_source() {
        let err = Error::BalanceRetrieval {
            bank: BankId::new(3),
            source: anyhow::anyhow!("bank offline"),
        };
        assert!(!err.is_invalid_transfer());
        assert_eq!(
            err.to_string(),
            "balance retrieval failed for bank 3: bank offline"
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("bank offline"));
    }

    #[test]
    fn test_overflow_messages() {
        let err: Error = InvalidTransfer::AmountOverflow {
            from_bank: BankId::new(1),
            to_bank: BankId::new(2),
        }
        .into();
        assert!(err.is_invalid_transfer());
        assert_eq!(
            err.to_string(),
            "Invalid transfer: debt from bank 1 to bank 2 would exceed the representable range"
        );

        let err = Error::PositionOverflow { bank: BankId::new(3) };
        assert!(!err.is_invalid_transfer());
    }
}
