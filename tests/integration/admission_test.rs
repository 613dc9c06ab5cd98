//! Admission scenarios against a fresh in-memory kill switch

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use trade_guard::audit::NoopSink;
use trade_guard::lock::MemoryLockStore;
use trade_guard::risk::{Clock, DenyReason, KillSwitch, ManualClock};

fn manual_switch(starting: Decimal) -> (KillSwitch, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    ));
    let switch = KillSwitch::new(
        starting,
        Arc::new(MemoryLockStore::new()),
        Arc::new(NoopSink),
        clock.clone(),
    );
    (switch, clock)
}

#[test]
fn test_hard_cap_boundary_at_100() {
    let switch = KillSwitch::in_memory(dec!(100));
    assert!(switch.check_order_allowed(dec!(5.00), dec!(100), None).is_allowed());

    let decision = switch.check_order_allowed(dec!(5.01), dec!(100), None);
    assert!(matches!(
        decision.deny_reason(),
        Some(DenyReason::AboveHardMax { .. })
    ));
}

#[test]
fn test_exact_cap_allowed_one_cent_over_denied() {
    for bankroll in [dec!(20.01), dec!(40), dec!(60), dec!(99.99), dec!(100), dec!(500)] {
        let switch = KillSwitch::in_memory(dec!(100));
        let cap = (bankroll * dec!(0.05)).min(dec!(5.00));

        assert!(
            switch.check_order_allowed(cap, bankroll, None).is_allowed(),
            "cap {cap} at bankroll {bankroll}"
        );
        assert!(
            !switch
                .check_order_allowed(cap + dec!(0.01), bankroll, None)
                .is_allowed(),
            "cap+0.01 at bankroll {bankroll}"
        );
    }
}

#[test]
fn test_floor_denies_and_hard_stops_for_every_bankroll_up_to_20() {
    let mut bankroll = Decimal::ZERO;
    while bankroll <= dec!(20) {
        let switch = KillSwitch::in_memory(dec!(100));
        let decision = switch.check_order_allowed(dec!(0.01), bankroll, None);
        assert!(
            matches!(decision.deny_reason(), Some(DenyReason::BankrollFloor { .. })),
            "bankroll {bankroll}"
        );
        assert!(switch.get_status().hard_stopped);

        // Once stopped, a healthy bankroll does not help
        let decision = switch.check_order_allowed(dec!(1), dec!(100), None);
        assert!(matches!(
            decision.deny_reason(),
            Some(DenyReason::HardStopped { .. })
        ));
        bankroll += dec!(0.25);
    }
}

#[test]
fn test_daily_loss_then_soft_stop() {
    let (switch, _clock) = manual_switch(dec!(100));
    switch.record_loss(dec!(20));

    let first = switch.check_order_allowed(dec!(1), dec!(80), None);
    assert!(matches!(
        first.deny_reason(),
        Some(DenyReason::DailyLossLimit { .. })
    ));
    assert!(first.reason().contains("Daily loss"));

    let second = switch.check_order_allowed(dec!(1), dec!(80), None);
    assert!(matches!(
        second.deny_reason(),
        Some(DenyReason::SoftStopDailyLoss { .. })
    ));
}

#[test]
fn test_daily_soft_stop_clears_next_utc_day() {
    let (switch, clock) = manual_switch(dec!(100));
    switch.record_loss(dec!(20));
    assert!(!switch.check_order_allowed(dec!(1), dec!(80), None).is_allowed());

    clock.set(Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 1).unwrap());
    assert!(switch.check_order_allowed(dec!(1), dec!(80), None).is_allowed());
    assert_eq!(switch.get_status().daily_loss_usd, Decimal::ZERO);
    // Lifetime loss is never reset by the day roll
    assert_eq!(switch.get_status().realized_loss_usd, dec!(20));
}

#[test]
fn test_four_losses_cool_for_two_hours() {
    let (switch, clock) = manual_switch(dec!(1000));
    for _ in 0..4 {
        switch.record_loss(dec!(1));
    }

    let decision = switch.check_order_allowed(dec!(1), dec!(1000), None);
    match decision.deny_reason() {
        Some(DenyReason::SoftStopCooling {
            minutes_remaining, ..
        }) => assert_eq!(*minutes_remaining, 120),
        other => panic!("expected cooling, got {other:?}"),
    }

    clock.advance(Duration::minutes(119));
    assert!(!switch.check_order_allowed(dec!(1), dec!(1000), None).is_allowed());

    clock.advance(Duration::minutes(1));
    assert!(switch.check_order_allowed(dec!(1), dec!(1000), None).is_allowed());
}

#[test]
fn test_loss_during_cooling_does_not_extend_it() {
    let (switch, clock) = manual_switch(dec!(1000));
    let start = clock.now();
    for _ in 0..4 {
        switch.record_loss(dec!(1));
    }
    assert_eq!(
        switch.snapshot().cooling_until,
        Some(start + Duration::hours(2))
    );

    clock.advance(Duration::minutes(30));
    switch.record_loss(dec!(1));

    let state = switch.snapshot();
    assert_eq!(state.consecutive_losses, 5);
    assert_eq!(state.cooling_until, Some(start + Duration::hours(2)));

    clock.set(start + Duration::hours(2));
    assert!(switch.check_order_allowed(dec!(1), dec!(1000), None).is_allowed());
}

#[test]
fn test_hourly_limit() {
    let (switch, clock) = manual_switch(dec!(100));
    for _ in 0..15 {
        assert!(switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());
        switch.record_trade();
    }
    assert!(matches!(
        switch.check_order_allowed(dec!(1), dec!(100), None).deny_reason(),
        Some(DenyReason::HourlyTradeLimit { count: 15, max: 15 })
    ));

    clock.advance(Duration::hours(1));
    assert!(switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());
    assert_eq!(switch.get_status().daily_trade_count, 15);
}

#[test]
fn test_window_close_boundary() {
    let switch = KillSwitch::in_memory(dec!(100));
    assert!(!switch.check_order_allowed(dec!(1), dec!(100), Some(5.0)).is_allowed());
    assert!(switch.check_order_allowed(dec!(1), dec!(100), Some(5.01)).is_allowed());
    assert!(switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());
}

#[test]
fn test_auth_failures_hard_stop() {
    let switch = KillSwitch::in_memory(dec!(100));
    switch.record_auth_failure();
    switch.record_auth_failure();
    switch.record_auth_success();
    switch.record_auth_failure();
    switch.record_auth_failure();
    assert!(switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());

    switch.record_auth_failure();
    assert!(matches!(
        switch.check_order_allowed(dec!(1), dec!(100), None).deny_reason(),
        Some(DenyReason::HardStopped { .. })
    ));
}

#[test]
fn test_paper_gate_ignores_soft_stops() {
    let switch = KillSwitch::in_memory(dec!(100));
    for _ in 0..4 {
        switch.record_loss(dec!(1));
    }
    assert!(!switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());
    assert!(switch.check_paper_order_allowed(dec!(50), dec!(100)).is_allowed());

    assert!(!switch.check_paper_order_allowed(dec!(1), dec!(20)).is_allowed());
    assert!(!switch.get_status().hard_stopped);
}

#[test]
fn test_hard_stop_is_monotonic_across_operations() {
    let switch = KillSwitch::in_memory(dec!(100));
    switch.trigger_manual_hard_stop("operator drill");

    switch.record_win();
    switch.record_auth_success();
    switch.restore_realized_loss(Decimal::ZERO);
    switch.restore_consecutive_losses(0);
    switch.record_trade();

    let status = switch.get_status();
    assert!(status.hard_stopped);
    assert!(status.hard_stop_reason.unwrap().contains("operator drill"));
    assert!(!switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());
}

#[test]
fn test_loss_counters_are_monotonic_within_a_day() {
    let (switch, clock) = manual_switch(dec!(1000));
    let mut last_daily = Decimal::ZERO;
    let mut last_realized = Decimal::ZERO;
    for (i, loss) in [dec!(1), dec!(0), dec!(-3), dec!(2.5), dec!(0.01)].iter().enumerate() {
        switch.record_loss(*loss);
        if i % 2 == 0 {
            switch.record_win();
        }
        clock.advance(Duration::minutes(30));
        let status = switch.get_status();
        assert!(status.daily_loss_usd >= last_daily);
        assert!(status.realized_loss_usd >= last_realized);
        last_daily = status.daily_loss_usd;
        last_realized = status.realized_loss_usd;
    }
    assert_eq!(last_realized, dec!(3.51));
}
