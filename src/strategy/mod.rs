//! Timeframe strategies
//!
//! Each strategy turns a candle series into a directional [`Analysis`]. The
//! engine maps timeframes to strategies and shields the pipeline from
//! strategy faults.

mod engine;
mod indicators;
mod trend_following;
mod trend_reversal;

pub use engine::{StrategyEngine, StrategyFlag, StrategyRegistry};
pub use indicators::{ema, rsi};
pub use trend_following::TrendFollowing;
pub use trend_reversal::TrendReversal;

use crate::candles::{Series, Timeframe};
use crate::signal::Analysis;
use thiserror::Error;

/// Strategy evaluation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StrategyError {
    /// A price that no market can produce
    #[error("Invalid price in series: {0}")]
    InvalidPrice(f64),
}

/// A signal-producing strategy bound to one timeframe
pub trait Strategy: Send + Sync {
    /// Stable identifier, reported as the signal's source
    fn name(&self) -> &str;

    /// Timeframe this instance serves
    fn timeframe(&self) -> &Timeframe;

    /// Analyze a series. Must not mutate shared state.
    fn analyze(&self, series: &Series) -> Result<Analysis, StrategyError>;
}

pub(crate) fn validate_prices(closes: &[f64]) -> Result<(), StrategyError> {
    match closes.iter().find(|c| **c <= 0.0 || !c.is_finite()) {
        Some(bad) => Err(StrategyError::InvalidPrice(*bad)),
        None => Ok(()),
    }
}
