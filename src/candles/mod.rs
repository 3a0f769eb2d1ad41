//! Candle series reconstruction
//!
//! Converts the feed's two candle encodings into one ordered OHLCV series.

mod aggregator;
mod types;

pub use aggregator::CandleAggregator;
pub use types::{Ohlcv, RawCandles, Series, Timeframe};
