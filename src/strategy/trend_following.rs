//! Trend following on short timeframes
//!
//! Fast/slow EMA alignment: trade in the direction of the trend when the
//! last close confirms it.

use super::indicators::ema;
use super::{validate_prices, Strategy, StrategyError};
use crate::candles::{Series, Timeframe};
use crate::signal::{Analysis, Confidence, Direction};

const FAST_PERIOD: usize = 5;
const SLOW_PERIOD: usize = 13;
/// Relative EMA separation that earns full confidence
const FULL_STRENGTH_SPREAD: f64 = 0.001;

/// EMA trend following strategy bound to one timeframe
#[derive(Debug, Clone)]
pub struct TrendFollowing {
    name: String,
    timeframe: Timeframe,
    min_confidence: Confidence,
}

impl TrendFollowing {
    /// Minimum confidence used when none is configured
    pub const DEFAULT_MIN_CONFIDENCE: u8 = 65;

    pub fn new(timeframe: Timeframe, min_confidence: Confidence) -> Self {
        Self {
            name: format!("trend_following_{timeframe}"),
            timeframe,
            min_confidence,
        }
    }
}

impl Strategy for TrendFollowing {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeframe(&self) -> &Timeframe {
        &self.timeframe
    }

    fn analyze(&self, series: &Series) -> Result<Analysis, StrategyError> {
        let closes = series.closes();
        if closes.len() <= SLOW_PERIOD {
            return Ok(Analysis::hold());
        }
        validate_prices(&closes)?;

        let (Some(fast), Some(slow), Some(&last)) = (
            ema(&closes, FAST_PERIOD),
            ema(&closes, SLOW_PERIOD),
            closes.last(),
        ) else {
            return Ok(Analysis::hold());
        };

        let direction = if fast > slow && last >= fast {
            Direction::Buy
        } else if fast < slow && last <= fast {
            Direction::Sell
        } else {
            return Ok(Analysis::hold());
        };

        let spread = ((fast - slow) / slow).abs();
        let strength = (spread / FULL_STRENGTH_SPREAD).min(1.0);
        let confidence = Confidence::from_score(50.0 + 50.0 * strength);

        tracing::trace!(
            strategy = %self.name,
            fast,
            slow,
            last,
            %confidence,
            "Trend following analysis"
        );

        Ok(Analysis::new(direction, confidence).gate(self.min_confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candles::Ohlcv;
    use chrono::{TimeZone, Utc};

    fn series(closes: &[f64]) -> Series {
        Series::from_records(
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| Ohlcv {
                    timestamp: Utc.timestamp_opt(i as i64 * 60, 0).unwrap(),
                    open: Some(*c),
                    high: Some(*c),
                    low: Some(*c),
                    close: Some(*c),
                    volume: Some(1.0),
                })
                .collect(),
        )
    }

    fn strategy() -> TrendFollowing {
        TrendFollowing::new(
            Timeframe::from("1m"),
            Confidence::new(TrendFollowing::DEFAULT_MIN_CONFIDENCE),
        )
    }

    #[test]
    fn test_uptrend_buys() {
        let closes: Vec<f64> = (0..20).map(|i| 1.0 + i as f64 * 0.01).collect();
        let analysis = strategy().analyze(&series(&closes)).unwrap();
        assert_eq!(analysis.direction, Direction::Buy);
        assert_eq!(analysis.confidence, Confidence::MAX);
    }

    #[test]
    fn test_downtrend_sells() {
        let closes: Vec<f64> = (0..20).map(|i| 2.0 - i as f64 * 0.01).collect();
        let analysis = strategy().analyze(&series(&closes)).unwrap();
        assert_eq!(analysis.direction, Direction::Sell);
    }

    #[test]
    fn test_flat_market_holds() {
        let analysis = strategy().analyze(&series(&[1.5; 20])).unwrap();
        assert_eq!(analysis, Analysis::hold());
    }

    #[test]
    fn test_short_series_holds() {
        let analysis = strategy().analyze(&series(&[1.0, 1.1, 1.2])).unwrap();
        assert_eq!(analysis, Analysis::hold());
    }

    #[test]
    fn test_weak_trend_gated_by_min_confidence() {
        // Tiny drift keeps the EMA spread far below full strength
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.0001).collect();
        let analysis = strategy().analyze(&series(&closes)).unwrap();
        assert_eq!(analysis, Analysis::hold());
    }

    #[test]
    fn test_non_positive_price_is_error() {
        let mut closes: Vec<f64> = (0..20).map(|i| 1.0 + i as f64 * 0.01).collect();
        closes[3] = 0.0;
        assert!(strategy().analyze(&series(&closes)).is_err());
    }

    #[test]
    fn test_name_includes_timeframe() {
        assert_eq!(strategy().name(), "trend_following_1m");
    }
}
