//! End-to-end configuration and replay tests

use pocket_signals::cli::replay::replay;
use pocket_signals::config::Config;
use pocket_signals::signal::Direction;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.connection.connect_timeout_secs, 15);
    assert_eq!(config.strategy.trend_following.timeframes.len(), 3);
    assert_eq!(config.signals.history_capacity, 100);
    assert!(config.telemetry.metrics_port.is_none());
}

#[test]
fn test_recorded_session_replays() {
    let mut lines = vec![
        r#"0{"sid":"rec","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#.to_string(),
        "40".to_string(),
        r#"42["auth/success",{"id":1}]"#.to_string(),
        r#"42["balance",{"balance":1250.5,"currency":"USD"}]"#.to_string(),
        r#"42["assets",["EURUSD","GBPUSD","USDJPY"]]"#.to_string(),
        "2".to_string(),
    ];
    let candles: Vec<String> = (0..20)
        .map(|i| {
            let close = 1.10 + i as f64 * 0.002;
            format!("[{},{},{},{},{},5]", 1_700_000_000 + i * 180, close, close, close, close)
        })
        .collect();
    lines.push(format!(
        r#"42["candles",{{"asset":"USDJPY","period":180,"candles":[{}]}}]"#,
        candles.join(",")
    ));
    lines.push(r#"42["somethingNew",{"x":1}]"#.to_string());

    let (signals, processor) = replay(&lines.join("\n"), &Config::default(), false).unwrap();

    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].direction, Direction::Buy);
    assert_eq!(signals[0].source_strategy, "trend_following_3m");

    let discovery = processor.pipeline().discovery();
    assert_eq!(discovery.len(), 3);
    assert!(discovery
        .observed_event_names()
        .contains(&"somethingNew".to_string()));
}
