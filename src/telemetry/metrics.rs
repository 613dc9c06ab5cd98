//! Prometheus metrics

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Admission checks that allowed a trade
    AdmissionAllowed,
    /// Admission checks that denied a trade
    AdmissionDenied,
    /// Hard-stop transitions
    HardStop,
    /// Failed durable writes for a hard stop
    HardStopWriteFailure,
    /// Trades recorded
    TradeRecorded,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Today's realized loss
    DailyLoss,
    /// Lifetime realized loss
    RealizedLoss,
    /// Current loss streak
    ConsecutiveLosses,
    /// Trades this hour
    HourlyTrades,
    /// 1 when hard-stopped
    HardStopped,
    /// 1 when a soft stop is active
    SoftStopped,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::AdmissionAllowed => "trade_guard_admissions_allowed_total",
        CounterMetric::AdmissionDenied => "trade_guard_admissions_denied_total",
        CounterMetric::HardStop => "trade_guard_hard_stops_total",
        CounterMetric::HardStopWriteFailure => "trade_guard_hard_stop_write_failures_total",
        CounterMetric::TradeRecorded => "trade_guard_trades_recorded_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::DailyLoss => "trade_guard_daily_loss_usd",
        GaugeMetric::RealizedLoss => "trade_guard_realized_loss_usd",
        GaugeMetric::ConsecutiveLosses => "trade_guard_consecutive_losses",
        GaugeMetric::HourlyTrades => "trade_guard_hourly_trades",
        GaugeMetric::HardStopped => "trade_guard_hard_stopped",
        GaugeMetric::SoftStopped => "trade_guard_soft_stopped",
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(counter_name(metric)).increment(1);
}

/// Increment a denial counter labelled with the check that fired
pub fn increment_denied(code: &'static str) {
    metrics::counter!(counter_name(CounterMetric::AdmissionDenied), "code" => code).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}

/// Set a gauge from a dollar amount
pub fn set_gauge_usd(metric: GaugeMetric, value: Decimal) {
    set_gauge(metric, value.to_f64().unwrap_or_default());
}
