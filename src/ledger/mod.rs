//! Ledger gateway consumed at startup
//!
//! The kill switch never queries the ledger itself. At startup the
//! composition root reads three figures from the ledger and feeds them to the
//! kill switch's restore calls so a restart does not forget how close the
//! process already was to a limit.

mod file;

pub use file::{SettledTrade, TradeLedger};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::risk::KillSwitch;

/// Read side of the trade ledger
///
/// `is_paper = false` restricts every figure to real-money outcomes.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Realized loss settled today (UTC), as a positive amount
    async fn todays_realized_loss_usd(&self, is_paper: bool) -> anyhow::Result<Decimal>;
    /// Realized loss over the ledger's lifetime, as a positive amount
    async fn lifetime_realized_loss_usd(&self, is_paper: bool) -> anyhow::Result<Decimal>;
    /// Losses since the most recent win
    async fn current_consecutive_loss_streak(&self, is_paper: bool) -> anyhow::Result<u32>;
}

/// Figures fed into the kill switch at startup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreSummary {
    pub daily_loss_usd: Decimal,
    pub realized_loss_usd: Decimal,
    pub consecutive_losses: u32,
}

/// Seed a fresh kill switch from real-money ledger history.
///
/// Any ledger error aborts before the first restore is applied, so callers
/// can refuse to start rather than trade with half-restored protections.
pub async fn restore_from_ledger(
    kill_switch: &KillSwitch,
    ledger: &dyn LedgerGateway,
) -> anyhow::Result<RestoreSummary> {
    let summary = RestoreSummary {
        daily_loss_usd: ledger.todays_realized_loss_usd(false).await?,
        realized_loss_usd: ledger.lifetime_realized_loss_usd(false).await?,
        consecutive_losses: ledger.current_consecutive_loss_streak(false).await?,
    };

    kill_switch.restore_daily_loss(summary.daily_loss_usd);
    kill_switch.restore_realized_loss(summary.realized_loss_usd);
    kill_switch.restore_consecutive_losses(summary.consecutive_losses);

    info!(
        daily_loss = %summary.daily_loss_usd,
        realized_loss = %summary.realized_loss_usd,
        streak = summary.consecutive_losses,
        "Kill switch restored from ledger"
    );
    Ok(summary)
}
