//! Bankroll stages and their per-trade caps

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};
use std::fmt;

/// Sizing stage, chosen by bankroll band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Bankroll below $100
    One,
    /// Bankroll from $100 to below $250
    Two,
    /// Bankroll $250 and up, no upper bound
    Three,
}

/// Lower bound of stage 2
pub const STAGE_TWO_MIN_BANKROLL: Decimal = dec!(100);
/// Lower bound of stage 3
pub const STAGE_THREE_MIN_BANKROLL: Decimal = dec!(250);

impl Stage {
    /// Stage number, 1 to 3
    pub fn number(self) -> u8 {
        match self {
            Stage::One => 1,
            Stage::Two => 2,
            Stage::Three => 3,
        }
    }

    /// Absolute per-trade cap for this stage
    pub fn cap_usd(self) -> Decimal {
        match self {
            Stage::One => dec!(5),
            Stage::Two => dec!(10),
            Stage::Three => dec!(15),
        }
    }

    /// Per-trade cap as a fraction of bankroll
    pub fn cap_pct(self) -> Decimal {
        match self {
            Stage::One | Stage::Two => dec!(0.05),
            Stage::Three => dec!(0.04),
        }
    }
}

/// Serialized as the stage number
impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {}", self.number())
    }
}

/// Stage for a bankroll: `[0,100)` is 1, `[100,250)` is 2, `[250,∞)` is 3
pub fn get_stage(bankroll_usd: Decimal) -> Stage {
    if bankroll_usd >= STAGE_THREE_MIN_BANKROLL {
        Stage::Three
    } else if bankroll_usd >= STAGE_TWO_MIN_BANKROLL {
        Stage::Two
    } else {
        Stage::One
    }
}
