//! CLI interface for trade-guard
//!
//! Provides subcommands for:
//! - `status`: Show kill switch state after restoring from the ledger
//! - `check`: Evaluate one trade against the admission gate
//! - `size`: Size a bet from win probability and payout
//! - `halt`: Write a manual hard-stop lock
//! - `reset`: Show and clear the hard-stop lock
//! - `watch`: Re-read ledger and lock on an interval, publishing metrics

mod check;
mod halt;
mod reset;
mod size;
mod status;
mod watch;

pub use check::CheckArgs;
pub use halt::HaltArgs;
pub use reset::ResetArgs;
pub use size::SizeArgs;
pub use status::StatusArgs;
pub use watch::WatchArgs;

use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::audit::{DurableSink, EventLog};
use crate::config::Config;
use crate::ledger::{restore_from_ledger, TradeLedger};
use crate::lock::{FileLockStore, LockStore};
use crate::risk::{KillSwitch, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "trade-guard")]
#[command(about = "Risk admission control and position sizing for an automated trading agent")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show kill switch state
    Status(StatusArgs),
    /// Evaluate one trade against the admission gate
    Check(CheckArgs),
    /// Size a bet
    Size(SizeArgs),
    /// Write a manual hard-stop lock
    Halt(HaltArgs),
    /// Show and clear the hard-stop lock
    Reset(ResetArgs),
    /// Re-read ledger and lock on an interval, publishing metrics
    Watch(WatchArgs),
}

/// Lock store configured for this deployment
pub fn lock_store(config: &Config) -> Arc<dyn LockStore> {
    Arc::new(FileLockStore::new(config.risk.lock_path.clone()))
}

/// Composition root: a kill switch with durable hard-stop writes, seeded
/// from the real-money ledger.
pub async fn open_kill_switch(config: &Config) -> anyhow::Result<Arc<KillSwitch>> {
    let lock = lock_store(config);
    let sink = DurableSink::new(lock.clone(), EventLog::new(config.risk.event_log_path.clone()));
    let kill_switch = KillSwitch::new(
        config.risk.starting_bankroll,
        lock,
        Arc::new(sink),
        Arc::new(SystemClock),
    );

    let ledger = TradeLedger::load(&config.ledger.path)?;
    restore_from_ledger(&kill_switch, &ledger).await?;

    Ok(Arc::new(kill_switch))
}
