//! Mutable admission-control state
//!
//! `RiskState` is plain data. All synchronization lives in
//! [`KillSwitch`](super::KillSwitch), which holds it behind one mutex and rolls
//! the windows as the first step of every call.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use super::types::SoftStop;

/// Hour bucket key, e.g. `2026-03-01T14`
pub fn hourly_window_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H").to_string()
}

/// Process-wide risk counters and flags
#[derive(Debug, Clone, PartialEq)]
pub struct RiskState {
    /// Bankroll at process start; never mutated
    pub starting_bankroll: Decimal,
    pub hard_stopped: bool,
    pub hard_stop_reason: Option<String>,
    pub soft_stop: Option<SoftStop>,
    pub daily_window_date: NaiveDate,
    pub daily_loss_usd: Decimal,
    pub daily_trade_count: u32,
    pub hourly_window_key: String,
    pub hourly_trade_count: u32,
    pub consecutive_losses: u32,
    pub cooling_until: Option<DateTime<Utc>>,
    pub consecutive_auth_failures: u32,
    /// Lifetime realized loss; only grows via loss recording
    pub realized_loss_usd: Decimal,
}

impl RiskState {
    /// Fresh state with windows anchored at `now`
    pub fn new(starting_bankroll: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            starting_bankroll,
            hard_stopped: false,
            hard_stop_reason: None,
            soft_stop: None,
            daily_window_date: now.date_naive(),
            daily_loss_usd: Decimal::ZERO,
            daily_trade_count: 0,
            hourly_window_key: hourly_window_key(now),
            hourly_trade_count: 0,
            consecutive_losses: 0,
            cooling_until: None,
            consecutive_auth_failures: 0,
            realized_loss_usd: Decimal::ZERO,
        }
    }

    /// Roll daily and hourly windows and expire time-based stops.
    ///
    /// Must run before any threshold is read or counter written.
    pub fn roll_windows(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today != self.daily_window_date {
            info!(
                from = %self.daily_window_date,
                to = %today,
                daily_loss = %self.daily_loss_usd,
                daily_trades = self.daily_trade_count,
                "Daily window rolled"
            );
            self.daily_window_date = today;
            self.daily_loss_usd = Decimal::ZERO;
            self.daily_trade_count = 0;
            if matches!(self.soft_stop, Some(SoftStop::DailyLoss { .. })) {
                info!("Daily-loss soft stop cleared by day rollover");
                self.soft_stop = None;
            }
        }

        let hour_key = hourly_window_key(now);
        if hour_key != self.hourly_window_key {
            self.hourly_window_key = hour_key;
            self.hourly_trade_count = 0;
        }

        if let Some(SoftStop::Cooling { until, .. }) = &self.soft_stop {
            if *until <= now {
                info!(until = %until, "Cooling soft stop expired");
                self.soft_stop = None;
            }
        }
        if self.cooling_until.is_some_and(|until| until <= now) {
            self.cooling_until = None;
        }
    }

    /// Cooling window end if it is still in the future
    pub fn active_cooling(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cooling_until.filter(|until| *until > now)
    }

    /// Lifetime loss as a fraction of starting bankroll
    pub fn realized_loss_pct(&self) -> Decimal {
        if self.starting_bankroll <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.realized_loss_usd / self.starting_bankroll
    }
}

/// Whole minutes until `until`, rounded up so a pending window never shows 0
pub fn minutes_until(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (until - now).num_seconds().max(0);
    (secs + 59) / 60
}
