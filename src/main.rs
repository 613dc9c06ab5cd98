use anyhow::Context;
use clap::Parser;
use trade_guard::cli::{Cli, Commands};
use trade_guard::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing config must never silently fall back to a default bankroll
    let config = Config::load(&cli.config)
        .with_context(|| format!("Could not load config from {}", cli.config))?;

    trade_guard::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Status(args) => args.execute(&config).await?,
        Commands::Check(args) => args.execute(&config).await?,
        Commands::Size(args) => args.execute(&config)?,
        Commands::Halt(args) => {
            tracing::warn!(reason = %args.reason, "Operator hard stop requested");
            args.execute(&config).await?;
        }
        Commands::Reset(args) => args.execute(&config)?,
        Commands::Watch(args) => args.execute(&config).await?,
    }

    Ok(())
}
