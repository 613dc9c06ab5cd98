//! Persisted lock behavior across instances

use rust_decimal_macros::dec;
use std::sync::Arc;
use trade_guard::audit::{DurableSink, EventLog};
use trade_guard::lock::{
    prepare_reset, FileLockStore, LockStore, RESET_CONFIRMATION_TOKEN,
};
use trade_guard::risk::{DenyReason, KillSwitch, RiskError, SystemClock};

fn durable_switch(dir: &std::path::Path) -> (KillSwitch, Arc<FileLockStore>) {
    let store = Arc::new(FileLockStore::new(dir.join("KILL_SWITCH.lock")));
    let sink = DurableSink::new(store.clone(), EventLog::new(dir.join("risk_events.log")));
    let switch = KillSwitch::new(dec!(100), store.clone(), Arc::new(sink), Arc::new(SystemClock));
    (switch, store)
}

#[test]
fn test_hard_stop_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (switch, _) = durable_switch(dir.path());
        switch.restore_realized_loss(dec!(30));
    }

    let (restarted, store) = durable_switch(dir.path());
    assert!(store.exists());
    let decision = restarted.check_order_allowed(dec!(1), dec!(70), None);
    match decision.deny_reason() {
        Some(DenyReason::LockPresent { reason: Some(reason) }) => {
            assert!(reason.contains("30"))
        }
        other => panic!("expected lock denial, got {other:?}"),
    }

    let log = std::fs::read_to_string(dir.path().join("risk_events.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
}

#[test]
fn test_restarts_keep_operator_lock_record() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (switch, _) = durable_switch(dir.path());
        switch.trigger_manual_hard_stop("venue incident");
    }

    for _ in 0..3 {
        let (restarted, store) = durable_switch(dir.path());
        restarted.restore_realized_loss(dec!(30));
        assert!(restarted.get_status().hard_stopped);

        let record = store.read().unwrap().unwrap();
        assert_eq!(record.reason, "Manual: venue incident");
    }

    let log = std::fs::read_to_string(dir.path().join("risk_events.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("venue incident"));
}

#[test]
fn test_out_of_band_lock_blocks_without_hard_stop_flag() {
    let dir = tempfile::tempdir().unwrap();
    let (switch, _) = durable_switch(dir.path());
    assert!(switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());

    std::fs::write(dir.path().join("KILL_SWITCH.lock"), "not json").unwrap();
    assert!(matches!(
        switch.check_order_allowed(dec!(1), dec!(100), None).deny_reason(),
        Some(DenyReason::LockPresent { reason: None })
    ));
    assert!(!switch.check_paper_order_allowed(dec!(1), dec!(100)).is_allowed());
    assert!(!switch.get_status().hard_stopped);

    std::fs::remove_file(dir.path().join("KILL_SWITCH.lock")).unwrap();
    assert!(switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());
}

#[test]
fn test_operator_reset_flow() {
    let dir = tempfile::tempdir().unwrap();
    let (switch, store) = durable_switch(dir.path());
    switch.trigger_manual_hard_stop("venue incident");

    let pending = prepare_reset(store.as_ref()).unwrap();
    assert!(pending.record.reason.contains("venue incident"));

    let result = pending.clone().confirm("reset", store.as_ref());
    assert!(matches!(result, Err(RiskError::ConfirmationMismatch { .. })));
    assert!(store.exists());

    pending
        .confirm(RESET_CONFIRMATION_TOKEN, store.as_ref())
        .unwrap();
    assert!(!store.exists());
    assert!(matches!(prepare_reset(store.as_ref()), Err(RiskError::NoLock)));
}

#[test]
fn test_in_process_reset_restores_trading() {
    let dir = tempfile::tempdir().unwrap();
    let (switch, store) = durable_switch(dir.path());
    switch.record_auth_failure();
    switch.record_auth_failure();
    switch.record_auth_failure();
    assert!(store.exists());

    assert!(switch.reset_hard_stop("nope").is_err());
    assert!(!switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());

    let removed = switch.reset_hard_stop(RESET_CONFIRMATION_TOKEN).unwrap();
    assert!(removed.unwrap().reason.contains("auth"));
    assert!(!store.exists());
    let status = switch.get_status();
    assert!(!status.hard_stopped);
    assert_eq!(status.consecutive_auth_failures, 0);
    assert!(switch.check_order_allowed(dec!(1), dec!(100), None).is_allowed());
}
