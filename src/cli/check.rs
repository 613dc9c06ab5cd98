//! Check command implementation

use clap::Args;
use rust_decimal::Decimal;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Trade amount in dollars
    #[arg(long)]
    pub usd: Decimal,

    /// Current bankroll in dollars
    #[arg(long)]
    pub bankroll: Decimal,

    /// Minutes left in the market window
    #[arg(long)]
    pub minutes_remaining: Option<f64>,

    /// Use the reduced paper-trading gate
    #[arg(long)]
    pub paper: bool,
}

impl CheckArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let kill_switch = super::open_kill_switch(config).await?;

        let decision = if self.paper {
            kill_switch.check_paper_order_allowed(self.usd, self.bankroll)
        } else {
            kill_switch.check_order_allowed(self.usd, self.bankroll, self.minutes_remaining)
        };

        let verdict = if decision.is_allowed() { "ALLOW" } else { "DENY" };
        println!("{verdict}: {}", decision.reason());

        if !decision.is_allowed() {
            std::process::exit(2);
        }
        Ok(())
    }
}
