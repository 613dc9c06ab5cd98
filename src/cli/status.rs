//! Status command implementation

use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let kill_switch = super::open_kill_switch(config).await?;
        let status = kill_switch.get_status();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }

        println!("trade-guard status ({})", status.as_of.to_rfc3339());
        println!("  Starting bankroll: ${}", status.starting_bankroll);
        println!("  Lock present:      {}", status.lock_present);
        match &status.hard_stop_reason {
            Some(reason) => println!("  Hard stop:         {reason}"),
            None => println!("  Hard stop:         no"),
        }
        match &status.soft_stop {
            Some(soft) => println!("  Soft stop:         {}", soft.reason()),
            None => println!("  Soft stop:         no"),
        }
        println!(
            "  Daily loss:        ${} / ${} ({} trades)",
            status.daily_loss_usd, status.daily_loss_limit_usd, status.daily_trade_count
        );
        println!(
            "  Hourly trades:     {} ({})",
            status.hourly_trade_count, status.hourly_window_key
        );
        println!("  Loss streak:       {}", status.consecutive_losses);
        if let Some(minutes) = status.cooling_minutes_remaining {
            println!("  Cooling:           {minutes} min remaining");
        }
        println!(
            "  Lifetime loss:     ${} ({}%)",
            status.realized_loss_usd,
            (status.realized_loss_pct * rust_decimal_macros::dec!(100)).round_dp(2)
        );
        Ok(())
    }
}
