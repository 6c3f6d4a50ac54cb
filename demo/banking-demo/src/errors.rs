use rust_decimal::Decimal;
use settlement_ledger::BankId;
use thiserror::Error;

use crate::accounts::AccountId;

pub type Result<T> = std::result::Result<T, BankingError>;

#[derive(Error, Debug)]
pub enum BankingError {
    #[error("Bank not found: {0}")]
    BankNotFound(BankId),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Decimal,
        requested: Decimal,
    },

    #[error("Ledger error: {0}")]
    Ledger(#[from] settlement_ledger::Error),
}
