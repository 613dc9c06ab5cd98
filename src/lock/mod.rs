//! Persisted hard-stop lock
//!
//! The lock record is the highest-priority admission signal. It lives outside
//! process memory so a hard stop survives restarts, and so an operator can
//! write or remove it out of band.

mod store;

pub use store::{FileLockStore, MemoryLockStore};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::risk::RiskError;

/// Token an operator must type to clear a hard stop
pub const RESET_CONFIRMATION_TOKEN: &str = "RESET-REAL-MONEY";

/// Contents of the persisted lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    pub triggered_at: DateTime<Utc>,
    pub reason: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub starting_bankroll: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub realized_loss_usd: Decimal,
}

impl fmt::Display for LockRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  triggered at:      {}", self.triggered_at.to_rfc3339())?;
        writeln!(f, "  reason:            {}", self.reason)?;
        writeln!(f, "  starting bankroll: ${}", self.starting_bankroll)?;
        write!(f, "  realized loss:     ${}", self.realized_loss_usd)
    }
}

/// Durable location of the lock record
///
/// Implementations can be a local file, a key-value entry or a database row.
pub trait LockStore: Send + Sync {
    /// Whether a lock is present. Must not be cached.
    fn exists(&self) -> bool;
    /// Read the lock, `None` if absent
    fn read(&self) -> Result<Option<LockRecord>, RiskError>;
    /// Write or overwrite the lock
    fn write(&self, record: &LockRecord) -> Result<(), RiskError>;
    /// Remove the lock; succeeds if already absent
    fn delete(&self) -> Result<(), RiskError>;
}

/// A lock read back for operator review, not yet deleted
#[derive(Debug, Clone)]
pub struct PendingReset {
    pub record: LockRecord,
}

impl PendingReset {
    /// Delete the lock if `typed` matches [`RESET_CONFIRMATION_TOKEN`]
    pub fn confirm(self, typed: &str, store: &dyn LockStore) -> Result<LockRecord, RiskError> {
        verify_confirmation(typed)?;
        store.delete()?;
        info!(reason = %self.record.reason, "Hard-stop lock removed by operator");
        Ok(self.record)
    }
}

/// Re-read the lock so it can be shown before deletion
pub fn prepare_reset(store: &dyn LockStore) -> Result<PendingReset, RiskError> {
    match store.read()? {
        Some(record) => Ok(PendingReset { record }),
        None => Err(RiskError::NoLock),
    }
}

/// Check a typed confirmation token
pub fn verify_confirmation(typed: &str) -> Result<(), RiskError> {
    if typed.trim() != RESET_CONFIRMATION_TOKEN {
        warn!("Reset refused: confirmation token mismatch");
        return Err(RiskError::ConfirmationMismatch {
            expected: RESET_CONFIRMATION_TOKEN,
        });
    }
    Ok(())
}
