//! Example configuration stays loadable

use rust_decimal_macros::dec;
use trade_guard::config::Config;

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();
    assert_eq!(config.risk.starting_bankroll, dec!(100));
    assert_eq!(config.sizing.min_edge_pct, dec!(0.08));
    assert!(config.telemetry.metrics_port.is_none());
}
