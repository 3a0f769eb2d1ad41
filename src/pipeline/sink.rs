//! Outbound collaborator interfaces
//!
//! The pipeline pushes to these and never reads back.

use crate::protocol::SessionState;
use crate::signal::Signal;
use crate::strategy::StrategyFlag;
use tokio::sync::mpsc;

/// What the presentation side is told
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    /// A non-hold signal
    Signal(Signal),
    /// Connection status change
    Status(SessionState),
}

/// What the configuration side is told
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    /// Capped snapshot of discovered asset symbols
    DiscoveredAssets(Vec<String>),
    /// Timeframe → strategy table currently in force
    StrategyFlags(Vec<StrategyFlag>),
}

/// Receives signals and status changes
pub trait PresentationSink: Send + Sync {
    fn present(&self, event: PresentationEvent);
}

/// Receives configuration updates
pub trait ConfigurationSink: Send + Sync {
    fn update(&self, update: ConfigUpdate);
}

impl PresentationSink for mpsc::UnboundedSender<PresentationEvent> {
    fn present(&self, event: PresentationEvent) {
        if self.send(event).is_err() {
            tracing::trace!("Presentation receiver dropped");
        }
    }
}

impl ConfigurationSink for mpsc::UnboundedSender<ConfigUpdate> {
    fn update(&self, update: ConfigUpdate) {
        if self.send(update).is_err() {
            tracing::trace!("Configuration receiver dropped");
        }
    }
}

/// Sink that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn present(&self, event: PresentationEvent) {
        match event {
            PresentationEvent::Signal(signal) => tracing::info!(
                asset = %signal.asset,
                timeframe = ?signal.timeframe.as_ref().map(|t| t.as_str()),
                direction = %signal.direction,
                confidence = %signal.confidence,
                strategy = %signal.source_strategy,
                "Signal"
            ),
            PresentationEvent::Status(state) => tracing::info!(state = %state, "Session status"),
        }
    }
}

impl ConfigurationSink for TracingSink {
    fn update(&self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::DiscoveredAssets(assets) => {
                tracing::info!(count = assets.len(), "Discovered assets updated")
            }
            ConfigUpdate::StrategyFlags(flags) => {
                for flag in flags {
                    tracing::info!(
                        timeframe = %flag.timeframe,
                        strategy = %flag.strategy,
                        "Strategy enabled"
                    );
                }
            }
        }
    }
}
