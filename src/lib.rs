//! trade-guard: risk admission control for a small-bankroll trading agent
//!
//! This library provides the core components for:
//! - A kill switch that approves or denies every real-money order
//! - Hard stops that survive restarts via a persisted lock
//! - Soft stops for daily loss and losing-streak cooling periods
//! - Quarter-Kelly position sizing with bankroll stages
//! - Restoring risk counters from the settlement ledger
//! - Logging and Prometheus metrics

pub mod audit;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod lock;
pub mod risk;
pub mod sizing;
pub mod telemetry;
