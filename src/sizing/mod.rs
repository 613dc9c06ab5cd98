//! Position sizing
//!
//! Turns a strategy's probabilistic edge into a bounded dollar stake using
//! quarter-Kelly, stage caps and a global ceiling. Every refusal is `None`;
//! callers treat "no trade" as an ordinary outcome of a polling loop.
//!
//! The final stake is floored to the cent. Rounding to nearest could put a
//! stake a fraction of a cent over the percent-of-bankroll cap, which the
//! admission check re-evaluates against the same bankroll.

mod kelly;
mod stage;

pub use kelly::kelly_fraction;
pub use stage::{get_stage, Stage, STAGE_THREE_MIN_BANKROLL, STAGE_TWO_MIN_BANKROLL};

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Fractional Kelly multiplier (quarter-Kelly)
pub const KELLY_FRACTION: Decimal = dec!(0.25);

/// Global per-trade ceiling across all stages
pub const ABSOLUTE_MAX_USD: Decimal = dec!(15);

/// Smallest stake worth the fixed transaction fee
pub const MIN_VIABLE_USD: Decimal = dec!(0.50);

/// Edge floor used when the caller does not supply one
pub const DEFAULT_MIN_EDGE_PCT: Decimal = dec!(0.08);

/// Which bound set the final stake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitingFactor {
    Kelly,
    StageCap,
    PctCap,
    AbsoluteCap,
}

impl fmt::Display for LimitingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LimitingFactor::Kelly => "kelly",
            LimitingFactor::StageCap => "stage_cap",
            LimitingFactor::PctCap => "pct_cap",
            LimitingFactor::AbsoluteCap => "absolute_cap",
        };
        f.write_str(name)
    }
}

/// Sized stake recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeResult {
    /// Final stake, floored to the cent
    pub recommended_usd: Decimal,
    /// Quarter-Kelly stake before any cap
    pub kelly_raw_usd: Decimal,
    pub stage: Stage,
    pub stage_cap_usd: Decimal,
    pub pct_cap_usd: Decimal,
    pub limiting_factor: LimitingFactor,
    pub edge_pct: Decimal,
}

/// Size a bet, or refuse.
///
/// `min_edge_pct` lets each strategy apply its own edge threshold; `None`
/// falls back to [`DEFAULT_MIN_EDGE_PCT`].
pub fn calculate_size(
    win_prob: Decimal,
    payout_per_dollar: Decimal,
    edge_pct: Decimal,
    bankroll_usd: Decimal,
    min_edge_pct: Option<Decimal>,
) -> Option<SizeResult> {
    let min_edge = min_edge_pct.unwrap_or(DEFAULT_MIN_EDGE_PCT);
    if edge_pct < min_edge {
        debug!(edge = %edge_pct, min_edge = %min_edge, "Edge below threshold, no bet");
        return None;
    }

    if bankroll_usd <= Decimal::ZERO {
        return None;
    }

    // The caller's edge estimate and the Kelly fraction are independent checks
    let Some(kelly) = kelly_fraction(win_prob, payout_per_dollar) else {
        debug!(payout = %payout_per_dollar, "Non-positive payout, no bet");
        return None;
    };
    if kelly <= Decimal::ZERO {
        debug!(kelly = %kelly, "Non-positive Kelly fraction, no bet");
        return None;
    }

    let kelly_raw_usd = kelly * KELLY_FRACTION * bankroll_usd;

    let stage = get_stage(bankroll_usd);
    let stage_cap_usd = stage.cap_usd();
    let pct_cap_usd = bankroll_usd * stage.cap_pct();

    let mut amount = kelly_raw_usd;
    let mut limiting_factor = LimitingFactor::Kelly;
    if amount > stage_cap_usd {
        amount = stage_cap_usd;
        limiting_factor = LimitingFactor::StageCap;
    }
    if amount > pct_cap_usd {
        amount = pct_cap_usd;
        limiting_factor = LimitingFactor::PctCap;
    }
    if amount > ABSOLUTE_MAX_USD {
        amount = ABSOLUTE_MAX_USD;
        limiting_factor = LimitingFactor::AbsoluteCap;
    }

    let recommended_usd = floor_to_cent(amount);
    if recommended_usd < MIN_VIABLE_USD {
        debug!(
            recommended = %recommended_usd,
            min = %MIN_VIABLE_USD,
            "Stake below minimum viable size"
        );
        return None;
    }

    debug!(
        raw_kelly = %kelly.round_dp(4),
        kelly_usd = %kelly_raw_usd.round_dp(4),
        recommended = %recommended_usd,
        %stage,
        limiting = %limiting_factor,
        "Bet sized"
    );

    Some(SizeResult {
        recommended_usd,
        kelly_raw_usd,
        stage,
        stage_cap_usd,
        pct_cap_usd,
        limiting_factor,
        edge_pct,
    })
}

/// Round down to whole cents
pub fn floor_to_cent(usd: Decimal) -> Decimal {
    usd.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity)
}
