//! Kelly criterion for a binary bet

use rust_decimal::Decimal;

/// Raw Kelly fraction `f* = (p*b - q) / b`
///
/// `win_prob` is p, `payout_per_dollar` is the net payout b. Returns `None`
/// when b is not positive.
pub fn kelly_fraction(win_prob: Decimal, payout_per_dollar: Decimal) -> Option<Decimal> {
    if payout_per_dollar <= Decimal::ZERO {
        return None;
    }
    let lose_prob = Decimal::ONE - win_prob;
    Some((win_prob * payout_per_dollar - lose_prob) / payout_per_dollar)
}
