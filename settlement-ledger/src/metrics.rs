//! Metrics collection for observability
//!
//! Prometheus metrics for monitoring the interbank ledger.
//!
//! # Metrics
//!
//! - `ledger_transfers_recorded_total` - Transfers accepted by the ledger
//! - `ledger_transfers_rejected_total` - Transfers refused by validation
//! - `ledger_transfers_offset_total` - Transfers that cancelled opposing debt
//! - `ledger_open_positions` - Outstanding directional debts
//! - `ledger_balance_lookup_failures_total` - Balance source failures
//!
//! Every collector lives on its own [`Registry`], so several ledgers can run
//! side by side in one process.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct LedgerMetrics {
    /// Transfers accepted
    pub transfers_recorded: IntCounter,

    /// Transfers refused
    pub transfers_rejected: IntCounter,

    /// Transfers netted against an opposing debt
    pub transfers_offset: IntCounter,

    /// Outstanding directional debts
    pub open_positions: IntGauge,

    /// Balance source failures
    pub balance_lookup_failures: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl std::fmt::Debug for LedgerMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerMetrics")
            .field("transfers_recorded", &self.transfers_recorded.get())
            .field("transfers_rejected", &self.transfers_rejected.get())
            .field("transfers_offset", &self.transfers_offset.get())
            .field("open_positions", &self.open_positions.get())
            .field("balance_lookup_failures", &self.balance_lookup_failures.get())
            .finish()
    }
}

impl LedgerMetrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transfers_recorded = IntCounter::new(
            "ledger_transfers_recorded_total",
            "Transfers accepted by the ledger",
        )?;
        registry.register(Box::new(transfers_recorded.clone()))?;

        let transfers_rejected = IntCounter::new(
            "ledger_transfers_rejected_total",
            "Transfers refused by validation",
        )?;
        registry.register(Box::new(transfers_rejected.clone()))?;

        let transfers_offset = IntCounter::new(
            "ledger_transfers_offset_total",
            "Transfers that cancelled part or all of an opposing debt",
        )?;
        registry.register(Box::new(transfers_offset.clone()))?;

        let open_positions = IntGauge::new(
            "ledger_open_positions",
            "Outstanding directional debts between banks",
        )?;
        registry.register(Box::new(open_positions.clone()))?;

        let balance_lookup_failures = IntCounter::new(
            "ledger_balance_lookup_failures_total",
            "Balance source lookups that failed",
        )?;
        registry.register(Box::new(balance_lookup_failures.clone()))?;

        Ok(Self {
            transfers_recorded,
            transfers_rejected,
            transfers_offset,
            open_positions,
            balance_lookup_failures,
            registry,
        })
    }

    /// Record an accepted transfer and the change it made to open positions
    pub fn record_transfer(&self, offset: bool, position_delta: i64) {
        self.transfers_recorded.inc();
        if offset {
            self.transfers_offset.inc();
        }
        self.open_positions.add(position_delta);
    }

    /// Record a refused transfer
    pub fn record_rejection(&self) {
        self.transfers_rejected.inc();
    }

    /// Record a failed balance lookup
    pub fn record_lookup_failure(&self) {
        self.balance_lookup_failures.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn gather_text(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
