//! Fixed risk thresholds
//!
//! None of these are read from configuration. Changing one is a code change
//! that goes through review.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Absolute per-trade ceiling in dollars, independent of bankroll
pub const HARD_MAX_TRADE_USD: Decimal = dec!(5.00);

/// Maximum trade as a fraction of current bankroll
pub const MAX_TRADE_PCT: Decimal = dec!(0.05);

/// Bankroll at or below this triggers a hard stop
pub const HARD_MIN_BANKROLL_USD: Decimal = dec!(20.00);

/// Daily realized loss, as a fraction of starting bankroll, that soft-stops trading
/// until the next UTC day
pub const DAILY_LOSS_LIMIT_PCT: Decimal = dec!(0.20);

/// Lifetime realized loss, as a fraction of starting bankroll, that hard-stops trading
pub const HARD_STOP_LOSS_PCT: Decimal = dec!(0.30);

/// Consecutive losses that open a cooling window
pub const CONSECUTIVE_LOSS_LIMIT: u32 = 4;

/// Length of the cooling window
pub const COOLING_PERIOD_HOURS: i64 = 2;

/// Trades admitted per UTC clock hour
pub const MAX_HOURLY_TRADES: u32 = 15;

/// Consecutive exchange authentication failures that hard-stop trading
pub const MAX_AUTH_FAILURES: u32 = 3;

/// Entries with this many minutes or fewer left in the market window are refused
pub const MIN_MINUTES_REMAINING: f64 = 5.0;

/// Dollar amount of the daily loss soft stop for a given starting bankroll
pub fn daily_loss_limit_usd(starting_bankroll: Decimal) -> Decimal {
    starting_bankroll * DAILY_LOSS_LIMIT_PCT
}
