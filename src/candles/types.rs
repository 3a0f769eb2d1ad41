//! Candle types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Candle bucket duration label, e.g. `1m` or `5m`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Timeframe(String);

impl Timeframe {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into().trim().to_lowercase())
    }

    /// Build from a payload `period`: either a label or a number of seconds
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::new(s.as_str())),
            Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f > 0.0 && *f <= u64::MAX as f64)
                        .map(|f| f as u64)
                })
                .filter(|secs| *secs > 0)
                .map(Self::from_seconds),
            _ => None,
        }
    }

    /// `60` becomes `1m`, `300` becomes `5m`, `30` stays `30s`
    pub fn from_seconds(secs: u64) -> Self {
        if secs % 3600 == 0 {
            Self(format!("{}h", secs / 3600))
        } else if secs % 60 == 0 {
            Self(format!("{}m", secs / 60))
        } else {
            Self(format!("{secs}s"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timeframe {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Timeframe {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

impl From<Timeframe> for String {
    fn from(timeframe: Timeframe) -> Self {
        timeframe.0
    }
}

/// One OHLCV bucket. `None` marks a field whose value could not be coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Candle series ordered by non-decreasing timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    records: Vec<Ohlcv>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, sorting stably by timestamp
    pub fn from_records(mut records: Vec<Ohlcv>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Ohlcv] {
        &self.records
    }

    pub fn last(&self) -> Option<&Ohlcv> {
        self.records.last()
    }

    /// Closing prices, skipping missing values
    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.close).collect()
    }
}

/// Candle payload with its encoding resolved
#[derive(Debug, Clone, PartialEq)]
pub enum RawCandles {
    /// `[timestamp, open, high, low, close, volume]` per entry
    Positional(Vec<Vec<Value>>),
    /// `{ts|timestamp, open, high, low, close, volume}` per entry
    Keyed(Vec<Map<String, Value>>),
    /// Missing or empty candle list
    Empty,
    /// Entries of a type neither encoding accepts
    Unrecognized(&'static str),
}

impl RawCandles {
    /// Resolve the encoding from the first entry. Entries that do not match
    /// it are dropped here so later stages see a single shape.
    pub fn from_value(value: Option<&Value>) -> Self {
        let entries = match value {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            Some(Value::Array(_)) | Some(Value::Null) | None => return RawCandles::Empty,
            Some(other) => return RawCandles::Unrecognized(json_type(other)),
        };

        match &entries[0] {
            Value::Array(_) => {
                let rows: Vec<Vec<Value>> = entries
                    .iter()
                    .filter_map(|e| e.as_array().cloned())
                    .collect();
                log_dropped(entries.len(), rows.len());
                RawCandles::Positional(rows)
            }
            Value::Object(_) => {
                let rows: Vec<Map<String, Value>> = entries
                    .iter()
                    .filter_map(|e| e.as_object().cloned())
                    .collect();
                log_dropped(entries.len(), rows.len());
                RawCandles::Keyed(rows)
            }
            other => RawCandles::Unrecognized(json_type(other)),
        }
    }

    /// Number of entries carried
    pub fn len(&self) -> usize {
        match self {
            RawCandles::Positional(rows) => rows.len(),
            RawCandles::Keyed(rows) => rows.len(),
            RawCandles::Empty | RawCandles::Unrecognized(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn log_dropped(total: usize, kept: usize) {
    if kept < total {
        tracing::warn!(
            dropped = total - kept,
            kept,
            "Candle entries with mixed encodings, dropping mismatched entries"
        );
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
