//! Strategy registry and dispatch engine

use super::{Strategy, TrendFollowing, TrendReversal};
use crate::candles::{Series, Timeframe};
use crate::config::StrategyConfig;
use crate::signal::{Analysis, Confidence, Signal};
use serde::Serialize;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

/// Enabled strategy per timeframe, as announced to the configuration sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyFlag {
    pub timeframe: Timeframe,
    pub strategy: String,
}

/// Fixed one-to-one mapping from timeframe to strategy
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<Timeframe, Box<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard table: trend reversal on its timeframe, one trend
    /// following instance per short timeframe. Disabled strategies are left
    /// out, so their timeframes hold.
    pub fn from_config(config: &StrategyConfig) -> Self {
        let mut registry = Self::new();

        let reversal = &config.trend_reversal;
        if reversal.enabled {
            registry.register(TrendReversal::new(
                reversal.timeframe.clone(),
                Confidence::new(reversal.min_confidence),
            ));
        }

        let following = &config.trend_following;
        if following.enabled {
            for timeframe in &following.timeframes {
                registry.register(TrendFollowing::new(
                    timeframe.clone(),
                    Confidence::new(following.min_confidence),
                ));
            }
        }

        registry
    }

    /// Register a strategy under its own timeframe, replacing any previous one
    pub fn register(&mut self, strategy: impl Strategy + 'static) {
        let timeframe = strategy.timeframe().clone();
        if let Some(previous) = self.strategies.insert(timeframe.clone(), Box::new(strategy)) {
            tracing::warn!(
                timeframe = %timeframe,
                replaced = previous.name(),
                "Timeframe already mapped, replacing strategy"
            );
        }
    }

    pub fn get(&self, timeframe: &Timeframe) -> Option<&dyn Strategy> {
        self.strategies.get(timeframe).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Current timeframe → strategy table
    pub fn flags(&self) -> Vec<StrategyFlag> {
        self.strategies
            .iter()
            .map(|(timeframe, strategy)| StrategyFlag {
                timeframe: timeframe.clone(),
                strategy: strategy.name().to_string(),
            })
            .collect()
    }
}

/// Runs the strategy mapped to a timeframe. Never fails: unmapped
/// timeframes and strategy faults both yield `{hold, 0}`.
pub struct StrategyEngine {
    registry: StrategyRegistry,
}

impl StrategyEngine {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Analyze a series with the strategy for `timeframe`
    pub fn analyze(&self, series: &Series, timeframe: Option<&Timeframe>) -> Analysis {
        self.run(series, timeframe).0
    }

    /// Analyze and wrap the outcome as a signal for `asset`
    pub fn evaluate(&self, asset: &str, timeframe: Option<&Timeframe>, series: &Series) -> Signal {
        let (analysis, source) = self.run(series, timeframe);
        Signal::new(asset, timeframe.cloned(), analysis, source)
    }

    fn run(&self, series: &Series, timeframe: Option<&Timeframe>) -> (Analysis, String) {
        let Some(strategy) = timeframe.and_then(|tf| self.registry.get(tf)) else {
            tracing::trace!(timeframe = ?timeframe, "No strategy for timeframe");
            return (Analysis::hold(), String::new());
        };

        let name = strategy.name().to_string();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.analyze(series)));

        let analysis = match outcome {
            Ok(Ok(analysis)) => analysis,
            Ok(Err(e)) => {
                tracing::error!(strategy = %name, error = %e, "Strategy failed, holding");
                Analysis::hold()
            }
            Err(_) => {
                tracing::error!(strategy = %name, "Strategy panicked, holding");
                Analysis::hold()
            }
        };

        (analysis, name)
    }
}
