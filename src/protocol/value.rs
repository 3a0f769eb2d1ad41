//! Lenient coercion of JSON payload values
//!
//! The feed mixes JSON numbers and numeric strings, so every numeric read
//! goes through these helpers. `None` means the value could not be coerced.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Coerce to a finite `f64`
pub fn as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce to a `Decimal`, accepting scientific notation
pub fn as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Coerce Unix seconds (possibly fractional) to a UTC instant with
/// millisecond precision
pub fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let secs = as_f64(value)?;
    let millis = (secs * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Coerce to a non-negative count
pub fn as_count(value: &Value) -> Option<u64> {
    let n = as_f64(value)?;
    (n >= 0.0).then_some(n as u64)
}
