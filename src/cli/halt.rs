//! Halt command implementation

use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct HaltArgs {
    /// Reason recorded in the lock and event log
    #[arg(long)]
    pub reason: String,
}

impl HaltArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let kill_switch = super::open_kill_switch(config).await?;
        kill_switch.trigger_manual_hard_stop(self.reason.clone());

        let status = kill_switch.get_status();
        if !status.lock_present {
            anyhow::bail!(
                "Hard stop active in memory but lock {} was not written",
                config.risk.lock_path.display()
            );
        }
        println!("Hard stop lock written to {}", config.risk.lock_path.display());
        Ok(())
    }
}
