//! Prometheus metrics

use crate::protocol::SessionState;
use crate::signal::Direction;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One inbound frame, decode through signal emission
    FrameHandling,
    /// One strategy run over a candle batch
    StrategyEvaluation,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Numeric code of the current session state
    SessionState,
    /// Distinct asset symbols discovered
    KnownAssets,
    /// Signals retained in history
    HistorySize,
}

/// Start the Prometheus exporter on `0.0.0.0:port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(addr = %addr, "Prometheus metrics exporter started");
    Ok(())
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::FrameHandling => "pocket_frame_handling_seconds",
        LatencyMetric::StrategyEvaluation => "pocket_strategy_evaluation_seconds",
    };

    histogram!(metric_name).record(duration.as_secs_f64());
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::SessionState => "pocket_session_state",
        GaugeMetric::KnownAssets => "pocket_known_assets",
        GaugeMetric::HistorySize => "pocket_signal_history_size",
    };

    gauge!(metric_name).set(value);
}

/// Count a decoded frame by kind
pub fn record_frame(kind: &'static str) {
    counter!("pocket_frames_total", "kind" => kind).increment(1);
}

/// Count a classified event by kind
pub fn record_event(kind: &'static str) {
    counter!("pocket_events_total", "kind" => kind).increment(1);
}

/// Count an emitted signal by direction
pub fn record_signal(direction: Direction) {
    let direction = match direction {
        Direction::Buy => "buy",
        Direction::Sell => "sell",
        Direction::Hold => "hold",
    };
    counter!("pocket_signals_total", "direction" => direction).increment(1);
}

/// Count and publish a session state change
pub fn record_session_state(state: SessionState) {
    counter!("pocket_session_transitions_total", "to" => state.to_string()).increment(1);
    set_gauge(GaugeMetric::SessionState, f64::from(state.code()));
}
