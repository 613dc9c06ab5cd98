//! Admission-control engine
//!
//! `KillSwitch` is the single arbiter of whether a trade may proceed. Every
//! trading worker shares one instance (behind an `Arc`). Each call takes the
//! state mutex once, rolls the daily and hourly windows, and then reads or
//! writes counters, so every call is atomic with respect to other callers.
//!
//! Hard stops are one-way. The in-memory flag is set inside the critical
//! section; the durable lock write and event-log append happen after the
//! mutex is released and their failure never undoes the flag. A lock that
//! is already present is left as written, so a restart that re-crosses a
//! threshold does not replace the record an operator is reviewing.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::clock::{Clock, SystemClock};
use super::limits::{
    daily_loss_limit_usd, CONSECUTIVE_LOSS_LIMIT, COOLING_PERIOD_HOURS, HARD_MAX_TRADE_USD,
    HARD_MIN_BANKROLL_USD, HARD_STOP_LOSS_PCT, MAX_AUTH_FAILURES, MAX_HOURLY_TRADES,
    MAX_TRADE_PCT, MIN_MINUTES_REMAINING,
};
use super::state::{minutes_until, RiskState};
use super::status::RiskStatus;
use super::types::{Decision, DenyReason, HardStopReason, RiskError, SoftStop};
use crate::audit::{HardStopSink, NoopSink};
use crate::lock::{verify_confirmation, LockRecord, LockStore, MemoryLockStore};
use crate::telemetry::{self, CounterMetric};

/// Shared admission-control engine
pub struct KillSwitch {
    state: Mutex<RiskState>,
    lock_store: Arc<dyn LockStore>,
    sink: Arc<dyn HardStopSink>,
    clock: Arc<dyn Clock>,
}

impl KillSwitch {
    /// Create an engine for a starting bankroll.
    ///
    /// `lock_store` is consulted on every check. `sink` receives hard-stop
    /// transitions; production passes a [`DurableSink`](crate::audit::DurableSink)
    /// writing to the same lock store.
    pub fn new(
        starting_bankroll: Decimal,
        lock_store: Arc<dyn LockStore>,
        sink: Arc<dyn HardStopSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        info!(starting_bankroll = %starting_bankroll, "Kill switch initialized");
        Self {
            state: Mutex::new(RiskState::new(starting_bankroll, now)),
            lock_store,
            sink,
            clock,
        }
    }

    /// Engine with an in-memory lock and no durable writes
    pub fn in_memory(starting_bankroll: Decimal) -> Self {
        Self::new(
            starting_bankroll,
            Arc::new(MemoryLockStore::new()),
            Arc::new(NoopSink),
            Arc::new(SystemClock),
        )
    }

    pub fn starting_bankroll(&self) -> Decimal {
        self.state.lock().starting_bankroll
    }

    /// Full pre-trade gate for real-money orders.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// lock, hard stop, soft stop, bankroll floor, hard cap, percent cap,
    /// daily loss, cooling, hourly count, window close.
    pub fn check_order_allowed(
        &self,
        trade_usd: Decimal,
        current_bankroll_usd: Decimal,
        minutes_remaining: Option<f64>,
    ) -> Decision {
        if let Some(deny) = self.check_lock() {
            return observe(Decision::Deny(deny));
        }

        let now = self.clock.now();
        let mut pending = None;
        let decision = {
            let mut state = self.state.lock();
            state.roll_windows(now);
            evaluate_real(
                &mut state,
                now,
                trade_usd,
                current_bankroll_usd,
                minutes_remaining,
                &mut pending,
            )
        };
        self.persist(pending);

        debug!(
            trade_usd = %trade_usd,
            bankroll = %current_bankroll_usd,
            decision = %decision.reason(),
            "Order admission checked"
        );
        observe(decision)
    }

    /// Reduced gate for simulated orders.
    ///
    /// Only the lock, hard stop and bankroll floor apply. Soft stops, cooling
    /// and hourly limits never block paper trades, and a simulated bankroll
    /// at the floor denies without hard-stopping real trading.
    pub fn check_paper_order_allowed(
        &self,
        trade_usd: Decimal,
        current_bankroll_usd: Decimal,
    ) -> Decision {
        if let Some(deny) = self.check_lock() {
            return observe(Decision::Deny(deny));
        }

        let decision = {
            let state = self.state.lock();
            if state.hard_stopped {
                Decision::Deny(DenyReason::HardStopped {
                    reason: state.hard_stop_reason.clone().unwrap_or_default(),
                })
            } else if current_bankroll_usd <= HARD_MIN_BANKROLL_USD {
                Decision::Deny(DenyReason::BankrollFloor {
                    bankroll: current_bankroll_usd,
                    floor: HARD_MIN_BANKROLL_USD,
                })
            } else {
                Decision::Allow
            }
        };

        debug!(
            trade_usd = %trade_usd,
            bankroll = %current_bankroll_usd,
            decision = %decision.reason(),
            "Paper order admission checked"
        );
        observe(decision)
    }

    /// Count an executed trade against the daily and hourly windows
    pub fn record_trade(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.roll_windows(now);
        state.daily_trade_count += 1;
        state.hourly_trade_count += 1;
        telemetry::increment(CounterMetric::TradeRecorded);
    }

    /// Record a settled loss. Non-positive amounts are ignored.
    pub fn record_loss(&self, loss_usd: Decimal) {
        if loss_usd <= Decimal::ZERO {
            return;
        }

        let now = self.clock.now();
        let pending = {
            let mut state = self.state.lock();
            state.roll_windows(now);
            state.daily_loss_usd += loss_usd;
            state.realized_loss_usd += loss_usd;
            state.consecutive_losses += 1;

            info!(
                loss_usd = %loss_usd,
                daily_loss = %state.daily_loss_usd,
                realized_loss = %state.realized_loss_usd,
                streak = state.consecutive_losses,
                "Loss recorded"
            );

            if state.consecutive_losses >= CONSECUTIVE_LOSS_LIMIT
                && state.active_cooling(now).is_none()
            {
                open_cooling(&mut state, now);
            }
            check_lifetime_loss(&mut state, now)
        };
        self.persist(pending);
    }

    /// Record a settled win. Resets the streak; an open cooling window stays.
    pub fn record_win(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.roll_windows(now);
        if state.consecutive_losses > 0 {
            debug!(streak = state.consecutive_losses, "Win resets loss streak");
        }
        state.consecutive_losses = 0;
    }

    /// Record a failed exchange authentication
    pub fn record_auth_failure(&self) {
        let now = self.clock.now();
        let pending = {
            let mut state = self.state.lock();
            state.consecutive_auth_failures += 1;
            let count = state.consecutive_auth_failures;
            warn!(count, max = MAX_AUTH_FAILURES, "Exchange auth failure");
            if count >= MAX_AUTH_FAILURES {
                enter_hard_stop(&mut state, HardStopReason::AuthFailures { count }, now)
            } else {
                None
            }
        };
        self.persist(pending);
    }

    /// Record a successful exchange authentication
    pub fn record_auth_success(&self) {
        self.state.lock().consecutive_auth_failures = 0;
    }

    /// Seed today's loss from the ledger at startup. Adds; never touches lifetime loss.
    pub fn restore_daily_loss(&self, usd: Decimal) {
        if usd <= Decimal::ZERO {
            return;
        }
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.roll_windows(now);
        state.daily_loss_usd += usd;
        info!(restored = %usd, daily_loss = %state.daily_loss_usd, "Daily loss restored");
    }

    /// Seed lifetime loss from the ledger at startup. Sets, then re-checks the
    /// hard-stop threshold immediately.
    pub fn restore_realized_loss(&self, usd: Decimal) {
        let now = self.clock.now();
        let pending = {
            let mut state = self.state.lock();
            state.roll_windows(now);
            state.realized_loss_usd = usd.max(Decimal::ZERO);
            info!(realized_loss = %state.realized_loss_usd, "Lifetime loss restored");
            check_lifetime_loss(&mut state, now)
        };
        self.persist(pending);
    }

    /// Seed the loss streak from the ledger at startup. A streak at the limit
    /// opens a fresh cooling window.
    pub fn restore_consecutive_losses(&self, count: u32) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.roll_windows(now);
        state.consecutive_losses = count;
        info!(streak = count, "Loss streak restored");
        if count >= CONSECUTIVE_LOSS_LIMIT {
            open_cooling(&mut state, now);
        }
    }

    /// Operator-initiated hard stop
    pub fn trigger_manual_hard_stop(&self, message: impl Into<String>) {
        let now = self.clock.now();
        let pending = {
            let mut state = self.state.lock();
            enter_hard_stop(
                &mut state,
                HardStopReason::Manual {
                    message: message.into(),
                },
                now,
            )
        };
        self.persist(pending);
    }

    /// Clear a hard stop after typed confirmation.
    ///
    /// Deletes the persisted lock and clears the in-memory hard stop and auth
    /// failure count. Loss counters and cooling are kept. Returns the lock
    /// record that was removed, if one was readable.
    pub fn reset_hard_stop(&self, confirmation: &str) -> Result<Option<LockRecord>, RiskError> {
        verify_confirmation(confirmation)?;

        // Held across the delete so a breach cannot land between delete and clear
        let mut state = self.state.lock();
        let previous = match self.lock_store.read() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Unreadable lock record, deleting anyway");
                None
            }
        };
        self.lock_store.delete()?;

        info!(
            previous_reason = ?state.hard_stop_reason,
            realized_loss = %state.realized_loss_usd,
            "Hard stop reset by operator"
        );
        state.hard_stopped = false;
        state.hard_stop_reason = None;
        state.consecutive_auth_failures = 0;
        Ok(previous)
    }

    /// Read-only snapshot for dashboards and the CLI
    pub fn get_status(&self) -> RiskStatus {
        let lock_present = self.lock_store.exists();
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.roll_windows(now);
        RiskStatus::from_state(&state, lock_present, now)
    }

    /// Copy of the raw state after rolling windows
    pub fn snapshot(&self) -> RiskState {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.roll_windows(now);
        state.clone()
    }

    fn check_lock(&self) -> Option<DenyReason> {
        if !self.lock_store.exists() {
            return None;
        }
        // A corrupt lock still blocks; only its reason is lost
        let reason = self
            .lock_store
            .read()
            .ok()
            .flatten()
            .map(|record| record.reason);
        Some(DenyReason::LockPresent { reason })
    }

    fn persist(&self, pending: Option<LockRecord>) {
        let Some(record) = pending else {
            return;
        };
        telemetry::increment(CounterMetric::HardStop);
        // An existing lock is the record under operator review; never replace it
        if self.lock_store.exists() {
            warn!(
                reason = %record.reason,
                "Lock already present, keeping existing record"
            );
            return;
        }
        if let Err(e) = self.sink.record_hard_stop(&record) {
            telemetry::increment(CounterMetric::HardStopWriteFailure);
            error!(
                error = %e,
                reason = %record.reason,
                "Failed to persist hard stop; in-memory stop remains active"
            );
        }
    }
}

fn evaluate_real(
    state: &mut RiskState,
    now: DateTime<Utc>,
    trade_usd: Decimal,
    bankroll: Decimal,
    minutes_remaining: Option<f64>,
    pending: &mut Option<LockRecord>,
) -> Decision {
    if state.hard_stopped {
        return Decision::Deny(DenyReason::HardStopped {
            reason: state.hard_stop_reason.clone().unwrap_or_default(),
        });
    }

    match &state.soft_stop {
        Some(SoftStop::Cooling { reason, until }) => {
            return Decision::Deny(DenyReason::SoftStopCooling {
                reason: reason.clone(),
                minutes_remaining: minutes_until(*until, now),
            });
        }
        Some(SoftStop::DailyLoss { reason }) => {
            return Decision::Deny(DenyReason::SoftStopDailyLoss {
                reason: reason.clone(),
            });
        }
        None => {}
    }

    if bankroll <= HARD_MIN_BANKROLL_USD {
        *pending = enter_hard_stop(state, HardStopReason::BankrollFloor { bankroll }, now);
        return Decision::Deny(DenyReason::BankrollFloor {
            bankroll,
            floor: HARD_MIN_BANKROLL_USD,
        });
    }

    if trade_usd > HARD_MAX_TRADE_USD {
        return Decision::Deny(DenyReason::AboveHardMax {
            trade_usd,
            max: HARD_MAX_TRADE_USD,
        });
    }

    // trade / bankroll > pct, without the division
    let cap_usd = bankroll * MAX_TRADE_PCT;
    if trade_usd > cap_usd {
        return Decision::Deny(DenyReason::AbovePctCap {
            trade_usd,
            bankroll,
            cap_usd,
        });
    }

    let limit = daily_loss_limit_usd(state.starting_bankroll);
    if state.daily_loss_usd >= limit {
        let reason = format!(
            "Daily loss ${} reached limit ${}",
            state.daily_loss_usd, limit
        );
        warn!(daily_loss = %state.daily_loss_usd, limit = %limit, "Daily loss soft stop engaged");
        state.soft_stop = Some(SoftStop::DailyLoss { reason });
        return Decision::Deny(DenyReason::DailyLossLimit {
            daily_loss: state.daily_loss_usd,
            limit,
        });
    }

    if let Some(until) = state.active_cooling(now) {
        return Decision::Deny(DenyReason::Cooling {
            minutes_remaining: minutes_until(until, now),
        });
    }

    if state.hourly_trade_count >= MAX_HOURLY_TRADES {
        return Decision::Deny(DenyReason::HourlyTradeLimit {
            count: state.hourly_trade_count,
            max: MAX_HOURLY_TRADES,
        });
    }

    if let Some(minutes) = minutes_remaining {
        if minutes <= MIN_MINUTES_REMAINING {
            return Decision::Deny(DenyReason::TooLateInWindow {
                minutes_remaining: minutes,
            });
        }
    }

    Decision::Allow
}

/// Open a cooling window of exactly `COOLING_PERIOD_HOURS` from `now`
fn open_cooling(state: &mut RiskState, now: DateTime<Utc>) {
    let until = now + Duration::hours(COOLING_PERIOD_HOURS);
    state.cooling_until = Some(until);
    let reason = format!(
        "{} consecutive losses, cooling for {}h",
        state.consecutive_losses, COOLING_PERIOD_HOURS
    );
    warn!(streak = state.consecutive_losses, until = %until, "Cooling window opened");
    // A daily-loss stop outlasts cooling; keep it in the slot
    if !matches!(state.soft_stop, Some(SoftStop::DailyLoss { .. })) {
        state.soft_stop = Some(SoftStop::Cooling { reason, until });
    }
}

fn check_lifetime_loss(state: &mut RiskState, now: DateTime<Utc>) -> Option<LockRecord> {
    if state.starting_bankroll <= Decimal::ZERO {
        return None;
    }
    if state.realized_loss_usd / state.starting_bankroll >= HARD_STOP_LOSS_PCT {
        let reason = HardStopReason::LifetimeLoss {
            realized_loss: state.realized_loss_usd,
            starting_bankroll: state.starting_bankroll,
        };
        return enter_hard_stop(state, reason, now);
    }
    None
}

/// One-way transition. Returns the record to persist, or `None` if already stopped.
fn enter_hard_stop(
    state: &mut RiskState,
    reason: HardStopReason,
    now: DateTime<Utc>,
) -> Option<LockRecord> {
    if state.hard_stopped {
        debug!(ignored = %reason, "Hard stop already active");
        return None;
    }

    let reason = reason.to_string();
    state.hard_stopped = true;
    state.hard_stop_reason = Some(reason.clone());
    error!(
        reason = %reason,
        starting_bankroll = %state.starting_bankroll,
        realized_loss = %state.realized_loss_usd,
        "HARD STOP TRIGGERED"
    );

    Some(LockRecord {
        triggered_at: now,
        reason,
        starting_bankroll: state.starting_bankroll,
        realized_loss_usd: state.realized_loss_usd,
    })
}

fn observe(decision: Decision) -> Decision {
    match &decision {
        Decision::Allow => telemetry::increment(CounterMetric::AdmissionAllowed),
        Decision::Deny(reason) => telemetry::increment_denied(reason.code()),
    }
    decision
}
