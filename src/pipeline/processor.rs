//! Event pipeline
//!
//! Classified events flow through discovery, candle aggregation and the
//! strategy engine. Actionable signals land in history and the presentation
//! sink. Every step is synchronous and bounded.

use super::sink::{ConfigUpdate, ConfigurationSink, PresentationEvent, PresentationSink};
use crate::candles::CandleAggregator;
use crate::config::Config;
use crate::market::AssetDiscovery;
use crate::protocol::SessionState;
use crate::router::{classify, CandleBatch, Event};
use crate::signal::{Signal, SignalHistory};
use crate::strategy::{StrategyEngine, StrategyRegistry};
use crate::telemetry::{self, GaugeMetric, LatencyMetric};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Application-event half of the ingestion path
pub struct Pipeline {
    engine: StrategyEngine,
    aggregator: CandleAggregator,
    history: Arc<SignalHistory>,
    discovery: Arc<AssetDiscovery>,
    presentation: Arc<dyn PresentationSink>,
    configuration: Arc<dyn ConfigurationSink>,
}

impl Pipeline {
    pub fn new(
        engine: StrategyEngine,
        history: Arc<SignalHistory>,
        discovery: Arc<AssetDiscovery>,
        presentation: Arc<dyn PresentationSink>,
        configuration: Arc<dyn ConfigurationSink>,
    ) -> Self {
        Self {
            engine,
            aggregator: CandleAggregator::new(),
            history,
            discovery,
            presentation,
            configuration,
        }
    }

    /// Build the strategy table, history and discovery from configuration
    pub fn from_config(
        config: &Config,
        presentation: Arc<dyn PresentationSink>,
        configuration: Arc<dyn ConfigurationSink>,
    ) -> Self {
        Self::new(
            StrategyEngine::new(StrategyRegistry::from_config(&config.strategy)),
            Arc::new(SignalHistory::new(config.signals.history_capacity)),
            Arc::new(AssetDiscovery::new(config.signals.asset_snapshot_limit)),
            presentation,
            configuration,
        )
    }

    pub fn history(&self) -> &Arc<SignalHistory> {
        &self.history
    }

    pub fn discovery(&self) -> &Arc<AssetDiscovery> {
        &self.discovery
    }

    pub fn engine(&self) -> &StrategyEngine {
        &self.engine
    }

    /// Push the enabled timeframe → strategy table to the configuration sink
    pub fn announce_strategy_flags(&self) {
        let flags = self.engine.registry().flags();
        tracing::info!(strategies = flags.len(), "Announcing strategy table");
        self.configuration.update(ConfigUpdate::StrategyFlags(flags));
    }

    /// Forward a session state change to the presentation sink
    pub fn report_status(&self, state: SessionState) {
        self.presentation.present(PresentationEvent::Status(state));
    }

    /// Process one application event. Returns the signal it produced, if
    /// any was actionable.
    pub fn handle_event(&self, name: &str, payload: &Value) -> Option<Signal> {
        self.discovery.observe_event_name(name);

        let event = classify(name, payload);
        telemetry::metrics::record_event(event.kind());

        if self.discovery.observe(&event) {
            telemetry::set_gauge(GaugeMetric::KnownAssets, self.discovery.len() as f64);
            self.configuration
                .update(ConfigUpdate::DiscoveredAssets(self.discovery.snapshot()));
        }

        match event {
            Event::CandleBatch(batch) => self.process_candles(&batch),
            Event::Tick(tick) => {
                tracing::trace!(asset = %tick.asset, price = ?tick.price, "Tick");
                None
            }
            Event::Balance(balance) => {
                if balance.is_unexpected_currency() {
                    tracing::warn!(
                        currency = %balance.currency,
                        balance = %balance.balance,
                        "Balance reported in unexpected currency"
                    );
                } else {
                    tracing::info!(
                        currency = %balance.currency,
                        balance = %balance.balance,
                        "Balance update"
                    );
                }
                None
            }
            Event::AssetList(list) => {
                tracing::debug!(count = list.count, "Asset list received");
                None
            }
            Event::Counters(counters) => {
                tracing::debug!(
                    pending_withdrawal = counters.pending_withdrawal,
                    achievements = counters.achievements,
                    support = counters.support,
                    "Counters update"
                );
                None
            }
            Event::Quote(_) | Event::AuthResult(_) | Event::Unknown { .. } => None,
        }
    }

    fn process_candles(&self, batch: &CandleBatch) -> Option<Signal> {
        let series = self.aggregator.to_series(&batch.candles);
        if series.is_empty() {
            tracing::debug!(asset = %batch.asset, "Empty candle batch");
            return None;
        }

        let started = Instant::now();
        let signal = self
            .engine
            .evaluate(&batch.asset, batch.timeframe.as_ref(), &series);
        telemetry::record_latency(LatencyMetric::StrategyEvaluation, started.elapsed());

        if !signal.is_actionable() {
            tracing::trace!(
                asset = %batch.asset,
                candles = series.len(),
                "Hold, discarding"
            );
            return None;
        }

        self.history.push(signal.clone());
        telemetry::metrics::record_signal(signal.direction);
        telemetry::set_gauge(GaugeMetric::HistorySize, self.history.len() as f64);
        self.presentation
            .present(PresentationEvent::Signal(signal.clone()));

        Some(signal)
    }
}
