//! Configuration types for trade-guard
//!
//! Only deployment details live here. Risk thresholds are constants in
//! [`crate::risk::limits`] and [`crate::sizing`] and cannot be configured.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

use crate::sizing::DEFAULT_MIN_EDGE_PCT;
use crate::telemetry::LogFormat;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub risk: RiskConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Kill switch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Bankroll the loss percentages are measured against
    pub starting_bankroll: Decimal,
    /// Persisted hard-stop lock
    #[serde(default = "default_lock_path")]
    pub lock_path: PathBuf,
    /// Append-only hard-stop event log
    #[serde(default = "default_event_log_path")]
    pub event_log_path: PathBuf,
}

fn default_lock_path() -> PathBuf {
    PathBuf::from("./state/KILL_SWITCH.lock")
}
fn default_event_log_path() -> PathBuf {
    PathBuf::from("./state/risk_events.log")
}

/// Position sizing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    /// Fallback edge floor for callers that do not pass their own
    #[serde(default = "default_min_edge_pct")]
    pub min_edge_pct: Decimal,
}

fn default_min_edge_pct() -> Decimal {
    DEFAULT_MIN_EDGE_PCT
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_edge_pct: DEFAULT_MIN_EDGE_PCT,
        }
    }
}

/// Settlement ledger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// JSON-lines file of settled trades
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("./state/settlements.jsonl")
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when absent
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the kill switch cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.risk.starting_bankroll <= Decimal::ZERO {
            anyhow::bail!(
                "risk.starting_bankroll must be positive, got {}",
                self.risk.starting_bankroll
            );
        }
        if self.sizing.min_edge_pct < Decimal::ZERO {
            anyhow::bail!("sizing.min_edge_pct must not be negative");
        }
        Ok(())
    }
}
