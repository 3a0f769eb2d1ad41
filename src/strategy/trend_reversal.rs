//! Trend reversal on the five minute timeframe
//!
//! RSI exhaustion confirmed by a counter-trend last candle.

use super::indicators::rsi;
use super::{validate_prices, Strategy, StrategyError};
use crate::candles::{Series, Timeframe};
use crate::signal::{Analysis, Confidence, Direction};

const RSI_PERIOD: usize = 14;
const OVERSOLD: f64 = 30.0;
const OVERBOUGHT: f64 = 70.0;
/// RSI points past the band that earn full confidence
const FULL_STRENGTH_DISTANCE: f64 = 20.0;

/// RSI reversal strategy bound to one timeframe
#[derive(Debug, Clone)]
pub struct TrendReversal {
    name: String,
    timeframe: Timeframe,
    min_confidence: Confidence,
}

impl TrendReversal {
    /// Minimum confidence used when none is configured
    pub const DEFAULT_MIN_CONFIDENCE: u8 = 70;

    pub fn new(timeframe: Timeframe, min_confidence: Confidence) -> Self {
        Self {
            name: format!("trend_reversal_{timeframe}"),
            timeframe,
            min_confidence,
        }
    }
}

impl Strategy for TrendReversal {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeframe(&self) -> &Timeframe {
        &self.timeframe
    }

    fn analyze(&self, series: &Series) -> Result<Analysis, StrategyError> {
        let closes = series.closes();
        if closes.len() <= RSI_PERIOD {
            return Ok(Analysis::hold());
        }
        validate_prices(&closes)?;

        let Some(value) = rsi(&closes, RSI_PERIOD) else {
            return Ok(Analysis::hold());
        };

        // The confirming candle needs both open and close
        let Some((open, close)) = series.last().and_then(|c| Some((c.open?, c.close?))) else {
            return Ok(Analysis::hold());
        };

        let (direction, distance) = if value <= OVERSOLD && close > open {
            (Direction::Buy, OVERSOLD - value)
        } else if value >= OVERBOUGHT && close < open {
            (Direction::Sell, value - OVERBOUGHT)
        } else {
            return Ok(Analysis::hold());
        };

        let strength = (distance / FULL_STRENGTH_DISTANCE).min(1.0);
        let confidence = Confidence::from_score(60.0 + 40.0 * strength);

        tracing::trace!(strategy = %self.name, rsi = value, %confidence, "Trend reversal analysis");

        Ok(Analysis::new(direction, confidence).gate(self.min_confidence))
    }
}
