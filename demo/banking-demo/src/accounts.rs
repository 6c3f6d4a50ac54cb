//! In-memory account book
//!
//! Just enough of a banking layer to drive the interbank ledger: banks,
//! accounts seeded with an opening balance, and admin transfers that record
//! on the ledger whenever money crosses a bank boundary.

use crate::errors::{BankingError, Result};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use settlement_ledger::{BalanceSource, BankId, InterbankLedger, TransferReceipt};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(u64);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bank {
    pub id: BankId,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub bank: BankId,
    pub owner: String,
    pub balance: Decimal,
    pub active: bool,
}

#[derive(Debug, Default)]
struct BookState {
    banks: BTreeMap<BankId, Bank>,
    accounts: BTreeMap<AccountId, Account>,
    next_bank_id: u64,
    next_account_id: u64,
}

impl BookState {
    fn active_account_mut(&mut self, id: AccountId) -> Result<&mut Account> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(BankingError::AccountNotFound(id))?;
        if !account.active {
            return Err(BankingError::AccountInactive(id));
        }
        Ok(account)
    }

    fn set_balance(&mut self, id: AccountId, balance: Decimal) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.balance = balance;
        }
    }

    fn active_account(&self, id: AccountId) -> Result<&Account> {
        let account = self
            .accounts
            .get(&id)
            .ok_or(BankingError::AccountNotFound(id))?;
        if !account.active {
            return Err(BankingError::AccountInactive(id));
        }
        Ok(account)
    }
}

/// Shared handle to the account book
///
/// Clones share state, so one handle can be given to the ledger as its
/// balance source while another keeps moving money.
#[derive(Debug, Clone)]
pub struct AccountBook {
    state: Arc<RwLock<BookState>>,
    opening_balance: Decimal,
}

impl AccountBook {
    pub fn new(opening_balance: Decimal) -> Self {
        Self {
            state: Arc::new(RwLock::new(BookState::default())),
            opening_balance,
        }
    }

    pub fn create_bank(&self, name: &str) -> Result<BankId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BankingError::Validation("bank name cannot be empty".to_string()));
        }

        let mut state = self.state.write();
        state.next_bank_id += 1;
        let id = BankId::new(state.next_bank_id);
        state.banks.insert(
            id,
            Bank {
                id,
                name: name.to_string(),
                abbreviation: abbreviation(name),
            },
        );

        tracing::info!(bank = %id, name, "Bank created");
        Ok(id)
    }

    pub fn bank(&self, id: BankId) -> Result<Bank> {
        self.state
            .read()
            .banks
            .get(&id)
            .cloned()
            .ok_or(BankingError::BankNotFound(id))
    }

    /// Open an account funded with the opening balance
    pub fn open_account(&self, bank: BankId, owner: &str) -> Result<AccountId> {
        let mut state = self.state.write();
        if !state.banks.contains_key(&bank) {
            return Err(BankingError::BankNotFound(bank));
        }

        state.next_account_id += 1;
        let id = AccountId(state.next_account_id);
        state.accounts.insert(
            id,
            Account {
                id,
                bank,
                owner: owner.trim().to_string(),
                balance: self.opening_balance,
                active: true,
            },
        );

        tracing::info!(account = %id, %bank, "Account opened");
        Ok(id)
    }

    pub fn account(&self, id: AccountId) -> Result<Account> {
        self.state
            .read()
            .accounts
            .get(&id)
            .cloned()
            .ok_or(BankingError::AccountNotFound(id))
    }

    pub fn deposit(&self, id: AccountId, amount: Decimal) -> Result<Decimal> {
        ensure_positive(amount)?;
        let mut state = self.state.write();
        let account = state.active_account_mut(id)?;
        account.balance = credit(account.balance, amount)?;
        Ok(account.balance)
    }

    pub fn withdraw(&self, id: AccountId, amount: Decimal) -> Result<Decimal> {
        ensure_positive(amount)?;
        let mut state = self.state.write();
        let account = state.active_account_mut(id)?;
        if account.balance < amount {
            return Err(BankingError::InsufficientFunds {
                account: id,
                balance: account.balance,
                requested: amount,
            });
        }
        account.balance -= amount;
        Ok(account.balance)
    }

    /// Soft delete: the account stays on file but no longer counts toward its bank
    pub fn close_account(&self, id: AccountId) -> Result<()> {
        let mut state = self.state.write();
        state.active_account_mut(id)?.active = false;
        tracing::info!(account = %id, "Account closed");
        Ok(())
    }

    /// Move money between any two accounts
    ///
    /// Transfers between banks are recorded on the ledger; the receipt is
    /// returned for those. Every check runs, and the ledger records, before
    /// either balance moves, so a refusal leaves both accounts untouched.
    pub fn admin_transfer(
        &self,
        ledger: &InterbankLedger,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<Option<TransferReceipt>> {
        ensure_positive(amount)?;
        if from == to {
            return Err(BankingError::Validation(
                "cannot transfer to the same account".to_string(),
            ));
        }

        let mut state = self.state.write();
        let (from_bank, from_balance) = {
            let account = state.active_account(from)?;
            (account.bank, account.balance)
        };
        let (to_bank, to_balance) = {
            let account = state.active_account(to)?;
            (account.bank, account.balance)
        };

        if from_balance < amount {
            return Err(BankingError::InsufficientFunds {
                account: from,
                balance: from_balance,
                requested: amount,
            });
        }
        let to_credited = credit(to_balance, amount)?;

        // Record first so a refusal leaves both accounts untouched
        let receipt = if from_bank == to_bank {
            tracing::debug!(%from, %to, %amount, "Intra-bank transfer, ledger untouched");
            None
        } else {
            let receipt = ledger.record_transfer(from_bank, to_bank, amount).map_err(|err| {
                tracing::warn!(%from, %to, %amount, "Transfer refused by ledger: {}", err);
                BankingError::from(err)
            })?;
            Some(receipt)
        };

        state.set_balance(from, from_balance - amount);
        state.set_balance(to, to_credited);

        Ok(receipt)
    }
}

impl BalanceSource for AccountBook {
    fn bank_total_balance(&self, bank: BankId) -> anyhow::Result<Decimal> {
        let state = self.state.read();
        if !state.banks.contains_key(&bank) {
            anyhow::bail!("bank {} is not registered", bank);
        }
        state
            .accounts
            .values()
            .filter(|account| account.bank == bank && account.active)
            .try_fold(Decimal::ZERO, |total, account| total.checked_add(account.balance))
            .ok_or_else(|| anyhow::anyhow!("total balance of bank {} overflows", bank))
    }
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(BankingError::Validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

fn credit(balance: Decimal, amount: Decimal) -> Result<Decimal> {
    balance
        .checked_add(amount)
        .ok_or_else(|| BankingError::Validation(format!("crediting {} would overflow the balance", amount)))
}

/// Upper-cased initials of each word
fn abbreviation(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase()
}
