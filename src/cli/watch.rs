//! Watch command implementation

use clap::Args;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::risk::RiskStatus;

/// Each tick re-reads the ledger and the lock, so counters track new
/// settlements as well as out-of-band lock changes.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Poll interval in seconds
    #[arg(long, default_value = "10")]
    pub interval_secs: u64,
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        let mut was_halted = None;

        info!(interval_secs = self.interval_secs, "Watching kill switch");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let status = match poll_status(config).await {
                        Ok(status) => status,
                        Err(e) => {
                            error!(error = %e, "Status poll failed");
                            continue;
                        }
                    };
                    status.publish_gauges();

                    let halted = status.is_halted();
                    if was_halted != Some(halted) {
                        if status.lock_present || status.hard_stopped {
                            error!(
                                reason = ?status.hard_stop_reason,
                                lock_present = status.lock_present,
                                "Trading hard-stopped"
                            );
                        } else if let Some(soft) = &status.soft_stop {
                            warn!(reason = soft.reason(), "Trading soft-stopped");
                        } else {
                            info!("Trading clear");
                        }
                        was_halted = Some(halted);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, exiting watch");
                    return Ok(());
                }
            }
        }
    }
}

/// Status of a kill switch freshly restored from the current ledger
pub async fn poll_status(config: &Config) -> anyhow::Result<RiskStatus> {
    let kill_switch = super::open_kill_switch(config).await?;
    Ok(kill_switch.get_status())
}
