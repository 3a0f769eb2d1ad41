//! Pipeline integration tests

use chrono::{TimeZone, Utc};
use pocket_signals::candles::{CandleAggregator, RawCandles, Timeframe};
use pocket_signals::config::Config;
use pocket_signals::pipeline::{ConfigUpdate, Pipeline, PresentationEvent};
use pocket_signals::protocol::{decode, encode, Frame};
use pocket_signals::router::{classify, Event};
use pocket_signals::signal::{Analysis, Confidence, Direction, Signal, SignalHistory};
use pocket_signals::strategy::{StrategyEngine, StrategyRegistry};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

fn channel_pipeline() -> (
    Pipeline,
    mpsc::UnboundedReceiver<PresentationEvent>,
    mpsc::UnboundedReceiver<ConfigUpdate>,
) {
    let (present_tx, present_rx) = mpsc::unbounded_channel::<PresentationEvent>();
    let (config_tx, config_rx) = mpsc::unbounded_channel::<ConfigUpdate>();
    let pipeline = Pipeline::from_config(
        &Config::default(),
        Arc::new(present_tx),
        Arc::new(config_tx),
    );
    (pipeline, present_rx, config_rx)
}

#[test]
fn test_five_minute_candles_scenario() {
    let raw = r#"42["candles",{"asset":"EURUSD","period":"5m","candles":[[0,1.1,1.12,1.09,1.11,100],[60,1.11,1.13,1.10,1.12,120]]}]"#;

    let Frame::Event { name, payload } = decode(raw) else {
        panic!("expected event frame");
    };
    let Event::CandleBatch(batch) = classify(&name, &payload) else {
        panic!("expected candle batch");
    };
    assert_eq!(batch.asset, "EURUSD");
    assert_eq!(batch.timeframe, Some(Timeframe::from("5m")));

    let series = CandleAggregator::new().to_series(&batch.candles);
    assert_eq!(series.len(), 2);
    assert_eq!(
        series.records()[0].timestamp,
        Utc.timestamp_opt(0, 0).unwrap()
    );
    assert_eq!(
        series.records()[1].timestamp,
        Utc.timestamp_opt(60, 0).unwrap()
    );
    assert_eq!(series.records()[1].close, Some(1.12));

    // Two candles are too few for RSI: reversal holds
    let engine = StrategyEngine::new(StrategyRegistry::from_config(&Config::default().strategy));
    let analysis = engine.analyze(&series, batch.timeframe.as_ref());
    assert_eq!(analysis, Analysis::hold());
}

#[test]
fn test_unmapped_timeframe_holds() {
    let engine = StrategyEngine::new(StrategyRegistry::from_config(&Config::default().strategy));
    let series = CandleAggregator::new().to_series(&RawCandles::from_value(Some(&json!([
        [0, 1.0, 1.0, 1.0, 1.0, 1],
        [60, 1.1, 1.1, 1.1, 1.1, 1]
    ]))));
    let analysis = engine.analyze(&series, Some(&Timeframe::from("4m")));
    assert_eq!(analysis.direction, Direction::Hold);
    assert_eq!(analysis.confidence, Confidence::ZERO);
}

#[test]
fn test_encode_decode_round_trip() {
    let payload = json!({"asset": "EURUSD", "nested": {"a": [1, 2, 3]}, "ok": true});
    match decode(&encode("changeSymbol", &payload)) {
        Frame::Event { name, payload: decoded } => {
            assert_eq!(name, "changeSymbol");
            assert_eq!(decoded, payload);
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_to_series_idempotent_on_canonical_input() {
    let raw = RawCandles::from_value(Some(&json!([
        [0, 1.0, 1.2, 0.9, 1.1, 10],
        [60, 1.1, 1.3, 1.0, 1.2, 11],
        [120, 1.2, 1.4, 1.1, 1.3, 12]
    ])));
    let aggregator = CandleAggregator::new();
    assert_eq!(aggregator.to_series(&raw), aggregator.to_series(&raw));
}

#[test]
fn test_history_keeps_last_hundred_of_one_fifty() {
    let history = SignalHistory::default();
    let signals: Vec<Signal> = (0..150)
        .map(|i| {
            let asset = if i % 2 == 0 { "EURUSD" } else { "GBPUSD" };
            Signal::new(
                asset,
                Some(Timeframe::from("1m")),
                Analysis::new(Direction::Buy, Confidence::new(70)),
                format!("seq_{i}"),
            )
        })
        .collect();
    for signal in &signals {
        history.push(signal.clone());
    }

    assert_eq!(history.len(), 100);
    let recent = history.recent(100);
    assert_eq!(recent.first().unwrap().id, signals[50].id);
    assert_eq!(recent.last().unwrap().id, signals[149].id);

    let eur = history.by_asset("EURUSD");
    assert_eq!(eur.len(), 50);
    assert!(eur
        .windows(2)
        .all(|w| w[0].generated_at <= w[1].generated_at));
    assert!(eur.iter().all(|s| s.asset == "EURUSD"));
}

#[test]
fn test_pipeline_signals_and_discovery() {
    let (pipeline, mut presentation, mut configuration) = channel_pipeline();

    let candles: Vec<serde_json::Value> = (0..20)
        .map(|i| {
            let close = 1.3 - i as f64 * 0.003;
            json!({"timestamp": i * 60, "open": close, "high": close, "low": close, "close": close, "volume": 1})
        })
        .collect();
    let signal = pipeline
        .handle_event(
            "candles",
            &json!({"asset": "GBPUSD", "period": 60, "candles": candles}),
        )
        .unwrap();
    assert_eq!(signal.direction, Direction::Sell);

    match presentation.try_recv().unwrap() {
        PresentationEvent::Signal(s) => assert_eq!(s.id, signal.id),
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(
        configuration.try_recv().unwrap(),
        ConfigUpdate::DiscoveredAssets(vec!["GBPUSD".to_string()])
    );
}
