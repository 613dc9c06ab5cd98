//! Startup restore from ledger history

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use trade_guard::audit::NoopSink;
use trade_guard::ledger::{restore_from_ledger, SettledTrade, TradeLedger};
use trade_guard::lock::MemoryLockStore;
use trade_guard::risk::{DenyReason, KillSwitch, ManualClock};

fn switch_at(clock: Arc<ManualClock>) -> KillSwitch {
    KillSwitch::new(
        dec!(100),
        Arc::new(MemoryLockStore::new()),
        Arc::new(NoopSink),
        clock,
    )
}

#[test]
fn test_restored_lifetime_loss_hard_stops_immediately() {
    let switch = KillSwitch::in_memory(dec!(100));
    switch.restore_realized_loss(dec!(30));

    assert!(switch.get_status().hard_stopped);
    assert!(matches!(
        switch.check_order_allowed(dec!(1), dec!(70), None).deny_reason(),
        Some(DenyReason::HardStopped { .. })
    ));
}

#[test]
fn test_restored_loss_below_threshold_trades() {
    let switch = KillSwitch::in_memory(dec!(100));
    switch.restore_realized_loss(dec!(29.99));
    assert!(!switch.get_status().hard_stopped);
    assert!(switch.check_order_allowed(dec!(1), dec!(70), None).is_allowed());
}

#[test]
fn test_restore_order_does_not_matter() {
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();

    type Step = fn(&KillSwitch);
    let steps: [Step; 3] = [
        |s| s.restore_daily_loss(dec!(12)),
        |s| s.restore_realized_loss(dec!(18)),
        |s| s.restore_consecutive_losses(4),
    ];
    let orders = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    let mut snapshots = Vec::new();
    for order in orders {
        let clock = Arc::new(ManualClock::new(start));
        let switch = switch_at(clock);
        for index in order {
            steps[index](&switch);
        }
        snapshots.push(switch.snapshot());
    }

    for snapshot in &snapshots[1..] {
        assert_eq!(snapshot, &snapshots[0]);
    }
    assert_eq!(snapshots[0].daily_loss_usd, dec!(12));
    assert_eq!(snapshots[0].realized_loss_usd, dec!(18));
    assert_eq!(snapshots[0].cooling_until, Some(start + Duration::hours(2)));
}

#[tokio::test]
async fn test_restore_from_ledger_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settlements.jsonl");
    let now = Utc::now();
    let yesterday = now - Duration::days(1);
    let lines = [
        format!(r#"{{"settled_at":"{}","pnl_usd":-10}}"#, yesterday.to_rfc3339()),
        format!(r#"{{"settled_at":"{}","pnl_usd":3.5}}"#, now.to_rfc3339()),
        "# paper fills are ignored".to_string(),
        format!(
            r#"{{"settled_at":"{}","pnl_usd":-40,"is_paper":true}}"#,
            now.to_rfc3339()
        ),
        format!(r#"{{"settled_at":"{}","pnl_usd":-2.25}}"#, now.to_rfc3339()),
    ];
    std::fs::write(&path, lines.join("\n")).unwrap();

    let ledger = TradeLedger::load(&path).unwrap();
    let switch = KillSwitch::in_memory(dec!(100));
    let summary = assert_ok!(restore_from_ledger(&switch, &ledger).await);

    assert_eq!(summary.realized_loss_usd, dec!(12.25));
    assert_eq!(summary.consecutive_losses, 1);
    let status = switch.get_status();
    assert_eq!(status.realized_loss_usd, dec!(12.25));
    assert!(!status.hard_stopped);
}

#[tokio::test]
async fn test_restore_from_ledger_trips_lifetime_stop() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap(),
    ));
    let trades = vec![
        SettledTrade::real(Utc.with_ymd_and_hms(2026, 2, 20, 10, 0, 0).unwrap(), dec!(-16)),
        SettledTrade::real(Utc.with_ymd_and_hms(2026, 2, 27, 10, 0, 0).unwrap(), dec!(-14)),
    ];
    let ledger = TradeLedger::from_trades(trades, clock.clone());
    let switch = switch_at(clock);

    assert_ok!(restore_from_ledger(&switch, &ledger).await);
    let status = switch.get_status();
    assert!(status.hard_stopped);
    assert_eq!(status.daily_loss_usd, Decimal::ZERO);
}

#[test]
fn test_malformed_ledger_refuses_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settlements.jsonl");
    std::fs::write(&path, "{\"settled_at\": \"not a date\", \"pnl_usd\": 1}\n").unwrap();
    assert_err!(TradeLedger::load(&path));
}
