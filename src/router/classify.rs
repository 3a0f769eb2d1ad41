//! Event classification
//!
//! Pure and total: every `(name, payload)` pair maps to an [`Event`]. A
//! payload missing a required key becomes [`Event::Unknown`].

use super::types::{
    AssetList, Balance, CandleBatch, Counters, Event, Quote, Tick, DEFAULT_CURRENCY,
};
use crate::candles::{RawCandles, Timeframe};
use crate::protocol::value::{as_count, as_decimal, as_timestamp};
use crate::protocol::AUTH_SUCCESS_EVENT;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Classify one application event
pub fn classify(name: &str, payload: &Value) -> Event {
    let event = match name {
        "tick" => classify_tick(payload),
        "candles" => classify_candles(payload),
        "assets" => classify_assets(payload),
        "quotes" => classify_quote(payload),
        "balance" => classify_balance(payload),
        "counters" | "counters/all/success" => classify_counters(payload),
        AUTH_SUCCESS_EVENT => Some(Event::AuthResult(payload.clone())),
        _ => None,
    };

    event.unwrap_or_else(|| {
        tracing::debug!(event = name, payload = %payload, "Unclassified event");
        Event::Unknown {
            name: name.to_string(),
            payload: payload.clone(),
        }
    })
}

fn asset_of(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("asset")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn classify_tick(payload: &Value) -> Option<Event> {
    let obj = payload.as_object()?;
    let decimal = |key: &str| obj.get(key).and_then(as_decimal);

    Some(Event::Tick(Tick {
        asset: asset_of(obj)?,
        price: decimal("price"),
        timestamp: obj.get("ts").and_then(as_timestamp),
        bid: decimal("bid"),
        ask: decimal("ask"),
        spread: decimal("spread"),
    }))
}

fn classify_candles(payload: &Value) -> Option<Event> {
    let obj = payload.as_object()?;

    Some(Event::CandleBatch(CandleBatch {
        asset: asset_of(obj)?,
        timeframe: obj.get("period").and_then(Timeframe::from_value),
        candles: RawCandles::from_value(obj.get("candles")),
        from: obj.get("from").and_then(as_timestamp),
        to: obj.get("to").and_then(as_timestamp),
    }))
}

fn classify_assets(payload: &Value) -> Option<Event> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(obj) => obj.get("instruments")?.as_array()?,
        _ => return None,
    };

    let assets: Vec<String> = entries
        .iter()
        .filter_map(|e| e.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    Some(Event::AssetList(AssetList {
        count: assets.len(),
        assets,
    }))
}

fn classify_quote(payload: &Value) -> Option<Event> {
    let obj = payload.as_object()?;
    Some(Event::Quote(Quote {
        asset: asset_of(obj)?,
        raw: payload.clone(),
    }))
}

fn classify_balance(payload: &Value) -> Option<Event> {
    let obj = payload.as_object()?;

    let currency = obj
        .get("currency")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string();
    let balance = obj
        .get("balance")
        .and_then(as_decimal)
        .unwrap_or(Decimal::ZERO);

    Some(Event::Balance(Balance { currency, balance }))
}

fn classify_counters(payload: &Value) -> Option<Event> {
    let obj = payload.as_object()?;
    let count = |key: &str| obj.get(key).and_then(as_count).unwrap_or(0);

    Some(Event::Counters(Counters {
        pending_withdrawal: count("pending-withdrawal"),
        achievements: count("achievements"),
        support: count("support"),
    }))
}
