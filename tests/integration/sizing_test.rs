//! Sizing feeding admission

use rust_decimal_macros::dec;
use trade_guard::risk::KillSwitch;
use trade_guard::sizing::{calculate_size, LimitingFactor, Stage};

#[test]
fn test_reference_sizing_is_admitted() {
    let size = calculate_size(dec!(0.60), dec!(1.27), dec!(0.12), dec!(50), None).unwrap();
    assert_eq!(size.recommended_usd, dec!(2.50));
    assert_eq!(size.limiting_factor, LimitingFactor::PctCap);

    let switch = KillSwitch::in_memory(dec!(50));
    assert!(switch
        .check_order_allowed(size.recommended_usd, dec!(50), Some(10.0))
        .is_allowed());
}

#[test]
fn test_stage_one_sizes_always_pass_pct_cap() {
    let mut bankroll = dec!(20.01);
    while bankroll < dec!(100) {
        let switch = KillSwitch::in_memory(dec!(100));
        if let Some(size) = calculate_size(dec!(0.90), dec!(1), dec!(0.40), bankroll, None) {
            assert_eq!(size.stage, Stage::One);
            assert!(
                switch
                    .check_order_allowed(size.recommended_usd, bankroll, None)
                    .is_allowed(),
                "size {} at bankroll {bankroll}",
                size.recommended_usd
            );
        }
        bankroll += dec!(1.37);
    }
}

#[test]
fn test_no_bet_below_edge_floor() {
    assert!(calculate_size(dec!(0.60), dec!(1.27), dec!(0.079), dec!(50), None).is_none());
}
