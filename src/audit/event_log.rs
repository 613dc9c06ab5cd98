//! Append-only, human-readable hard-stop event log

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::lock::LockRecord;
use crate::risk::RiskError;

/// One hard-stop entry
#[derive(Debug, Clone)]
pub struct HardStopEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    pub starting_bankroll: Decimal,
    pub realized_loss_usd: Decimal,
}

impl HardStopEvent {
    pub fn from_record(record: &LockRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: record.triggered_at,
            reason: record.reason.clone(),
            starting_bankroll: record.starting_bankroll,
            realized_loss_usd: record.realized_loss_usd,
        }
    }

    /// Single-line rendering
    pub fn to_line(&self) -> String {
        format!(
            "{} HARD STOP id={} reason=\"{}\" starting_bankroll=${} realized_loss=${}",
            self.timestamp.to_rfc3339(),
            self.id,
            self.reason,
            self.starting_bankroll,
            self.realized_loss_usd,
        )
    }
}

/// Append-only log file
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event; never truncates
    pub fn append(&self, event: &HardStopEvent) -> Result<(), RiskError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", event.to_line())?;
        file.sync_data()?;
        Ok(())
    }
}
