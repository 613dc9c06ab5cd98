//! Read-only status snapshot

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::limits::daily_loss_limit_usd;
use super::state::{minutes_until, RiskState};
use super::types::SoftStop;
use crate::telemetry::{self, GaugeMetric};

/// Current counters and flags of the kill switch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskStatus {
    pub as_of: DateTime<Utc>,
    pub starting_bankroll: Decimal,
    pub lock_present: bool,
    pub hard_stopped: bool,
    pub hard_stop_reason: Option<String>,
    pub soft_stop: Option<SoftStop>,
    pub daily_window_date: NaiveDate,
    pub daily_loss_usd: Decimal,
    pub daily_loss_limit_usd: Decimal,
    pub daily_trade_count: u32,
    pub hourly_window_key: String,
    pub hourly_trade_count: u32,
    pub consecutive_losses: u32,
    pub cooling_until: Option<DateTime<Utc>>,
    pub cooling_minutes_remaining: Option<i64>,
    pub consecutive_auth_failures: u32,
    pub realized_loss_usd: Decimal,
    pub realized_loss_pct: Decimal,
}

impl RiskStatus {
    pub(crate) fn from_state(state: &RiskState, lock_present: bool, now: DateTime<Utc>) -> Self {
        let cooling_until = state.active_cooling(now);
        Self {
            as_of: now,
            starting_bankroll: state.starting_bankroll,
            lock_present,
            hard_stopped: state.hard_stopped,
            hard_stop_reason: state.hard_stop_reason.clone(),
            soft_stop: state.soft_stop.clone(),
            daily_window_date: state.daily_window_date,
            daily_loss_usd: state.daily_loss_usd,
            daily_loss_limit_usd: daily_loss_limit_usd(state.starting_bankroll),
            daily_trade_count: state.daily_trade_count,
            hourly_window_key: state.hourly_window_key.clone(),
            hourly_trade_count: state.hourly_trade_count,
            consecutive_losses: state.consecutive_losses,
            cooling_until,
            cooling_minutes_remaining: cooling_until.map(|until| minutes_until(until, now)),
            consecutive_auth_failures: state.consecutive_auth_failures,
            realized_loss_usd: state.realized_loss_usd,
            realized_loss_pct: state.realized_loss_pct().round_dp(4),
        }
    }

    /// True when real-money trading is blocked regardless of trade size
    pub fn is_halted(&self) -> bool {
        self.lock_present || self.hard_stopped || self.soft_stop.is_some()
    }

    /// Publish the snapshot as gauges
    pub fn publish_gauges(&self) {
        telemetry::set_gauge_usd(GaugeMetric::DailyLoss, self.daily_loss_usd);
        telemetry::set_gauge_usd(GaugeMetric::RealizedLoss, self.realized_loss_usd);
        telemetry::set_gauge(GaugeMetric::ConsecutiveLosses, self.consecutive_losses as f64);
        telemetry::set_gauge(GaugeMetric::HourlyTrades, self.hourly_trade_count as f64);
        telemetry::set_gauge(
            GaugeMetric::HardStopped,
            if self.hard_stopped || self.lock_present { 1.0 } else { 0.0 },
        );
        telemetry::set_gauge(
            GaugeMetric::SoftStopped,
            if self.soft_stop.is_some() { 1.0 } else { 0.0 },
        );
    }
}
