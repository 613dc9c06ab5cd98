//! Reset command implementation

use clap::Args;

use crate::config::Config;
use crate::lock::{prepare_reset, RESET_CONFIRMATION_TOKEN};
use crate::risk::RiskError;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Confirmation token; without it the lock is only displayed
    #[arg(long)]
    pub confirm: Option<String>,
}

impl ResetArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = super::lock_store(config);

        let pending = match prepare_reset(store.as_ref()) {
            Ok(pending) => pending,
            Err(RiskError::NoLock) => {
                println!("No hard-stop lock at {}", config.risk.lock_path.display());
                return Ok(());
            }
            Err(RiskError::MalformedRecord(e)) => {
                anyhow::bail!(
                    "Lock at {} is unreadable ({e}); inspect and remove it by hand",
                    config.risk.lock_path.display()
                );
            }
            Err(e) => return Err(e.into()),
        };

        println!("Hard-stop lock at {}:", config.risk.lock_path.display());
        println!("{}", pending.record);

        let Some(typed) = &self.confirm else {
            println!();
            println!("Clearing this lock re-enables real-money trading.");
            println!("Re-run with --confirm {RESET_CONFIRMATION_TOKEN} to remove it.");
            return Ok(());
        };

        pending.confirm(typed, store.as_ref())?;
        println!("Lock removed. Restart trading workers to clear in-memory hard stops.");
        Ok(())
    }
}
