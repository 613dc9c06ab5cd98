//! JSON-lines settlement ledger

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::LedgerGateway;
use crate::risk::{Clock, SystemClock};

/// One settled trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledTrade {
    pub settled_at: DateTime<Utc>,
    /// Net P&L; negative is a loss
    pub pnl_usd: Decimal,
    #[serde(default)]
    pub is_paper: bool,
}

impl SettledTrade {
    pub fn real(settled_at: DateTime<Utc>, pnl_usd: Decimal) -> Self {
        Self {
            settled_at,
            pnl_usd,
            is_paper: false,
        }
    }

    pub fn paper(settled_at: DateTime<Utc>, pnl_usd: Decimal) -> Self {
        Self {
            settled_at,
            pnl_usd,
            is_paper: true,
        }
    }

    fn loss(&self) -> Decimal {
        if self.pnl_usd < Decimal::ZERO {
            -self.pnl_usd
        } else {
            Decimal::ZERO
        }
    }
}

/// Settlement history loaded into memory
pub struct TradeLedger {
    trades: Vec<SettledTrade>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TradeLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeLedger")
            .field("trades", &self.trades)
            .finish_non_exhaustive()
    }
}

impl TradeLedger {
    /// Ledger over trades, sorted by settlement time
    pub fn from_trades(mut trades: Vec<SettledTrade>, clock: Arc<dyn Clock>) -> Self {
        trades.sort_by_key(|t| t.settled_at);
        Self { trades, clock }
    }

    /// Load a JSON-lines file. A missing file is an empty ledger.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Ledger file not found, starting empty");
            return Ok(Self::from_trades(vec![], Arc::new(SystemClock)));
        }
        let content = std::fs::read_to_string(path)?;
        let mut trades = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let trade: SettledTrade = serde_json::from_str(line)
                .map_err(|e| anyhow::anyhow!("{}:{}: {}", path.display(), line_no + 1, e))?;
            trades.push(trade);
        }
        Ok(Self::from_trades(trades, Arc::new(SystemClock)))
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    fn matching(&self, is_paper: bool) -> impl DoubleEndedIterator<Item = &SettledTrade> {
        self.trades.iter().filter(move |t| t.is_paper == is_paper)
    }
}

#[async_trait]
impl LedgerGateway for TradeLedger {
    async fn todays_realized_loss_usd(&self, is_paper: bool) -> anyhow::Result<Decimal> {
        let today = self.clock.now().date_naive();
        Ok(self
            .matching(is_paper)
            .filter(|t| t.settled_at.date_naive() == today)
            .map(SettledTrade::loss)
            .sum())
    }

    async fn lifetime_realized_loss_usd(&self, is_paper: bool) -> anyhow::Result<Decimal> {
        Ok(self.matching(is_paper).map(SettledTrade::loss).sum())
    }

    async fn current_consecutive_loss_streak(&self, is_paper: bool) -> anyhow::Result<u32> {
        let mut streak = 0;
        // Scratches (zero P&L) neither extend nor break a streak
        for trade in self.matching(is_paper).rev() {
            if trade.pnl_usd < Decimal::ZERO {
                streak += 1;
            } else if trade.pnl_usd > Decimal::ZERO {
                break;
            }
        }
        Ok(streak)
    }
}
