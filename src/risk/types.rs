//! Risk management types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Risk management errors
///
/// Only durable I/O can fail. Denials are [`Decision`] values, not errors.
#[derive(Debug, Error)]
pub enum RiskError {
    /// Lock store or event log I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A persisted record could not be parsed or written
    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
    /// Operator typed the wrong confirmation token for a reset
    #[error("Confirmation token mismatch: type `{expected}` exactly to confirm")]
    ConfirmationMismatch { expected: &'static str },
    /// Reset requested but no hard-stop lock is persisted
    #[error("No hard-stop lock present")]
    NoLock,
}

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Trade may proceed
    Allow,
    /// Trade is refused
    Deny(DenyReason),
}

impl Decision {
    /// True if the trade may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// The denial, if any
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(reason),
        }
    }

    /// Human-readable reason, "ok" when allowed
    pub fn reason(&self) -> String {
        match self {
            Decision::Allow => "ok".to_string(),
            Decision::Deny(reason) => reason.to_string(),
        }
    }
}

/// Why a trade was refused, one variant per admission check
#[derive(Debug, Clone, PartialEq)]
pub enum DenyReason {
    /// A persisted hard-stop lock exists
    LockPresent { reason: Option<String> },
    /// In-memory hard stop is active
    HardStopped { reason: String },
    /// Cooling soft stop with a fixed expiry
    SoftStopCooling { reason: String, minutes_remaining: i64 },
    /// Daily-loss soft stop, clears on the next UTC day
    SoftStopDailyLoss { reason: String },
    /// Bankroll at or below the floor (also hard-stops real trading)
    BankrollFloor { bankroll: Decimal, floor: Decimal },
    /// Trade above the absolute per-trade ceiling
    AboveHardMax { trade_usd: Decimal, max: Decimal },
    /// Trade above the percent-of-bankroll cap
    AbovePctCap {
        trade_usd: Decimal,
        bankroll: Decimal,
        cap_usd: Decimal,
    },
    /// Daily realized loss reached the limit
    DailyLossLimit { daily_loss: Decimal, limit: Decimal },
    /// Cooling window after a loss streak
    Cooling { minutes_remaining: i64 },
    /// Hourly trade count reached
    HourlyTradeLimit { count: u32, max: u32 },
    /// Too close to the market window close
    TooLateInWindow { minutes_remaining: f64 },
}

impl DenyReason {
    /// Stable identifier, used as a metric label
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::LockPresent { .. } => "lock_present",
            DenyReason::HardStopped { .. } => "hard_stopped",
            DenyReason::SoftStopCooling { .. } => "soft_stop_cooling",
            DenyReason::SoftStopDailyLoss { .. } => "soft_stop_daily_loss",
            DenyReason::BankrollFloor { .. } => "bankroll_floor",
            DenyReason::AboveHardMax { .. } => "above_hard_max",
            DenyReason::AbovePctCap { .. } => "above_pct_cap",
            DenyReason::DailyLossLimit { .. } => "daily_loss_limit",
            DenyReason::Cooling { .. } => "cooling",
            DenyReason::HourlyTradeLimit { .. } => "hourly_trade_limit",
            DenyReason::TooLateInWindow { .. } => "too_late_in_window",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::LockPresent { reason: Some(r) } => {
                write!(f, "Kill switch lock exists ({r}): manual reset required")
            }
            DenyReason::LockPresent { reason: None } => {
                write!(f, "Kill switch lock exists: manual reset required")
            }
            DenyReason::HardStopped { reason } => write!(f, "Hard stop active: {reason}"),
            DenyReason::SoftStopCooling {
                reason,
                minutes_remaining,
            } => write!(f, "Soft stop: {reason} ({minutes_remaining} min remaining)"),
            DenyReason::SoftStopDailyLoss { reason } => {
                write!(f, "Soft stop: {reason} (clears at next UTC day)")
            }
            DenyReason::BankrollFloor { bankroll, floor } => {
                write!(f, "Bankroll ${bankroll} at or below floor ${floor}")
            }
            DenyReason::AboveHardMax { trade_usd, max } => {
                write!(f, "Trade ${trade_usd} exceeds hard cap ${max}")
            }
            DenyReason::AbovePctCap {
                trade_usd,
                bankroll,
                cap_usd,
            } => write!(
                f,
                "Trade ${trade_usd} exceeds 5% of bankroll ${bankroll} (cap ${cap_usd})"
            ),
            DenyReason::DailyLossLimit { daily_loss, limit } => {
                write!(f, "Daily loss limit hit: ${daily_loss} >= ${limit}")
            }
            DenyReason::Cooling { minutes_remaining } => write!(
                f,
                "Cooling after consecutive losses ({minutes_remaining} min remaining)"
            ),
            DenyReason::HourlyTradeLimit { count, max } => {
                write!(f, "Hourly trade limit reached: {count}/{max}")
            }
            DenyReason::TooLateInWindow { minutes_remaining } => write!(
                f,
                "Too late to enter: {minutes_remaining:.1} min remaining in window"
            ),
        }
    }
}

/// Cause of a hard stop
#[derive(Debug, Clone, PartialEq)]
pub enum HardStopReason {
    /// Bankroll fell to the floor
    BankrollFloor { bankroll: Decimal },
    /// Lifetime realized loss breached the hard-stop percentage
    LifetimeLoss {
        realized_loss: Decimal,
        starting_bankroll: Decimal,
    },
    /// Too many consecutive exchange auth failures
    AuthFailures { count: u32 },
    /// Operator-triggered
    Manual { message: String },
}

impl fmt::Display for HardStopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BankrollFloor { bankroll } => {
                write!(f, "Bankroll ${bankroll} at or below hard minimum")
            }
            Self::LifetimeLoss {
                realized_loss,
                starting_bankroll,
            } => write!(
                f,
                "Lifetime realized loss ${realized_loss} reached 30% of starting bankroll ${starting_bankroll}"
            ),
            Self::AuthFailures { count } => {
                write!(f, "{count} consecutive exchange auth failures")
            }
            Self::Manual { message } => write!(f, "Manual: {message}"),
        }
    }
}

/// A temporary halt that clears on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoftStop {
    /// Daily loss limit; clears when the UTC date advances
    DailyLoss { reason: String },
    /// Loss-streak cooling; clears when `until` passes
    Cooling {
        reason: String,
        until: DateTime<Utc>,
    },
}

impl SoftStop {
    pub fn reason(&self) -> &str {
        match self {
            SoftStop::DailyLoss { reason } | SoftStop::Cooling { reason, .. } => reason,
        }
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        match self {
            SoftStop::DailyLoss { .. } => None,
            SoftStop::Cooling { until, .. } => Some(*until),
        }
    }
}
