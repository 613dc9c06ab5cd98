//! Durable side effects of a hard stop
//!
//! The kill switch hands every hard-stop transition to a [`HardStopSink`].
//! Production wires a [`DurableSink`] (lock write plus event-log append);
//! tests wire a [`NoopSink`] so deliberate hard stops leave no operational
//! trace while in-memory state still transitions.

mod event_log;

pub use event_log::{EventLog, HardStopEvent};

use std::sync::Arc;

use crate::lock::{LockRecord, LockStore};
use crate::risk::RiskError;

/// Receives hard-stop transitions for durable recording
pub trait HardStopSink: Send + Sync {
    fn record_hard_stop(&self, record: &LockRecord) -> Result<(), RiskError>;
}

/// Writes the lock record and appends to the event log
pub struct DurableSink {
    lock: Arc<dyn LockStore>,
    log: EventLog,
}

impl DurableSink {
    pub fn new(lock: Arc<dyn LockStore>, log: EventLog) -> Self {
        Self { lock, log }
    }
}

impl HardStopSink for DurableSink {
    fn record_hard_stop(&self, record: &LockRecord) -> Result<(), RiskError> {
        // Both writes are attempted even if the first fails
        let lock_result = self.lock.write(record);
        let log_result = self.log.append(&HardStopEvent::from_record(record));
        lock_result.and(log_result)
    }
}

/// Discards hard-stop records
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl HardStopSink for NoopSink {
    fn record_hard_stop(&self, _record: &LockRecord) -> Result<(), RiskError> {
        Ok(())
    }
}
