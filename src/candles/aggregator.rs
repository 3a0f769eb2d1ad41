//! Candle aggregation
//!
//! Turns a resolved candle payload into a canonical [`Series`]. This sits on
//! the hot streaming path, so it never fails: bad input yields fewer records
//! or an empty series.

use super::types::{Ohlcv, RawCandles, Series};
use crate::protocol::value::{as_f64, as_timestamp};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

const TIMESTAMP_KEYS: [&str; 2] = ["ts", "timestamp"];

/// Stateless converter from raw candles to a series
#[derive(Debug, Clone, Copy, Default)]
pub struct CandleAggregator;

impl CandleAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Convert using the current instant for synthesized timestamps
    pub fn to_series(&self, raw: &RawCandles) -> Series {
        self.to_series_at(raw, Utc::now())
    }

    /// Convert with an explicit aggregation instant.
    ///
    /// Keyed batches without any `ts`/`timestamp` field get timestamps spaced
    /// one minute apart, the last one equal to `now`.
    pub fn to_series_at(&self, raw: &RawCandles, now: DateTime<Utc>) -> Series {
        let records = match raw {
            RawCandles::Positional(rows) => rows.iter().filter_map(|row| positional(row)).collect(),
            RawCandles::Keyed(rows) => keyed(rows, now),
            RawCandles::Empty => Vec::new(),
            RawCandles::Unrecognized(kind) => {
                tracing::warn!(kind, "Unknown candle format, skipping batch");
                Vec::new()
            }
        };

        Series::from_records(records)
    }
}

fn positional(row: &[Value]) -> Option<Ohlcv> {
    let field = |i: usize| row.get(i).and_then(as_f64);

    let Some(timestamp) = row.first().and_then(as_timestamp) else {
        tracing::warn!(row = ?row, "Candle without a usable timestamp, skipping");
        return None;
    };

    Some(Ohlcv {
        timestamp,
        open: field(1),
        high: field(2),
        low: field(3),
        close: field(4),
        volume: field(5),
    })
}

fn keyed(rows: &[Map<String, Value>], now: DateTime<Utc>) -> Vec<Ohlcv> {
    let has_timestamps = rows
        .iter()
        .any(|row| TIMESTAMP_KEYS.iter().any(|k| row.contains_key(*k)));

    if !has_timestamps {
        tracing::debug!(
            count = rows.len(),
            "Keyed candles without timestamps, synthesizing one-minute spacing"
        );
    }

    let last = rows.len().saturating_sub(1);
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let timestamp = if has_timestamps {
                let found = TIMESTAMP_KEYS
                    .iter()
                    .find_map(|k| row.get(*k).and_then(as_timestamp));
                match found {
                    Some(ts) => ts,
                    None => {
                        tracing::warn!(index = i, "Candle without a usable timestamp, skipping");
                        return None;
                    }
                }
            } else {
                now - Duration::minutes((last - i) as i64)
            };

            let field = |key: &str| row.get(key).and_then(as_f64);
            Some(Ohlcv {
                timestamp,
                open: field("open"),
                high: field("high"),
                low: field("low"),
                close: field("close"),
                volume: field("volume"),
            })
        })
        .collect()
}
