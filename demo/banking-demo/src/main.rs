//! Banking demo
//!
//! Runs two banks through a pair of opposing admin transfers and prints the
//! resulting settlement report as JSON.

mod accounts;
mod config;
mod errors;

use accounts::AccountBook;
use config::DemoConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use settlement_ledger::{InterbankLedger, NetPosition};

#[derive(Debug, Serialize)]
struct BankReport {
    bank_name: String,
    abbreviation: String,
    #[serde(flatten)]
    position: NetPosition,
    settlement_score: Decimal,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = DemoConfig::load()?;
    tracing::info!(opening_balance = %config.opening_balance, "Starting banking demo");

    let book = AccountBook::new(config.opening_balance);
    let ledger = InterbankLedger::with_config(book.clone(), config.ledger.clone())?;

    let go = book.create_bank("Bank of Go")?;
    let code = book.create_bank("Bank of Code")?;

    let john_checking = book.open_account(go, "John Doe")?;
    let john_savings = book.open_account(go, "John Doe")?;
    let jane = book.open_account(code, "Jane Smith")?;

    book.deposit(john_checking, dec!(500))?;
    book.withdraw(john_checking, dec!(300))?;

    // Same bank: never reaches the ledger
    book.admin_transfer(&ledger, john_checking, john_savings, dec!(100))?;

    // Across banks: 300 out, 100 back, netted to 200
    for (from, to, amount) in [(john_savings, jane, dec!(300)), (jane, john_checking, dec!(100))] {
        if let Some(receipt) = book.admin_transfer(&ledger, from, to, amount)? {
            tracing::info!(
                transfer_id = %receipt.transfer_id,
                offset = %receipt.offset,
                carried_forward = %receipt.carried_forward,
                "Interbank transfer recorded"
            );
        }
    }

    let mut report = Vec::new();
    for position in ledger.net_positions()? {
        let bank = book.bank(position.bank_id)?;
        report.push(BankReport {
            bank_name: bank.name,
            abbreviation: bank.abbreviation,
            settlement_score: position.settlement_score(),
            position,
        });
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    // Closed accounts drop out of their bank's actual balance
    let savings = book.account(john_savings)?;
    book.close_account(john_savings)?;
    let position = ledger.net_bank_position(savings.bank)?;
    tracing::info!(
        account = %savings.id,
        owner = %savings.owner,
        bank = %savings.bank,
        actual_balance = %position.actual_balance,
        settlement_score = %position.settlement_score(),
        "Account closed"
    );

    if let Some(metrics) = ledger.metrics() {
        tracing::debug!("Ledger metrics:\n{}", metrics.gather_text()?);
    }

    Ok(())
}
