//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use self::metrics::{record_latency, set_gauge, GaugeMetric, LatencyMetric};

use crate::config::TelemetryConfig;

/// Guard held for the lifetime of the process
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format)?;

    if let Some(port) = config.metrics_port {
        self::metrics::init_metrics(port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
