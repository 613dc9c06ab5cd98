//! Size command implementation

use clap::Args;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::sizing::calculate_size;

#[derive(Args, Debug)]
pub struct SizeArgs {
    /// Estimated win probability (0-1)
    #[arg(long)]
    pub win_prob: Decimal,

    /// Net payout per dollar staked
    #[arg(long)]
    pub payout: Decimal,

    /// Strategy's edge estimate (0-1)
    #[arg(long)]
    pub edge: Decimal,

    /// Current bankroll in dollars
    #[arg(long)]
    pub bankroll: Decimal,

    /// Edge floor; defaults to sizing.min_edge_pct
    #[arg(long)]
    pub min_edge: Option<Decimal>,
}

impl SizeArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let min_edge = self.min_edge.unwrap_or(config.sizing.min_edge_pct);
        match calculate_size(
            self.win_prob,
            self.payout,
            self.edge,
            self.bankroll,
            Some(min_edge),
        ) {
            Some(size) => println!("{}", serde_json::to_string_pretty(&size)?),
            None => println!("No bet recommended"),
        }
        Ok(())
    }
}
