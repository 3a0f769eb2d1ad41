//! Normalized application events

use crate::candles::{RawCandles, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Account currency assumed when a balance update omits it
pub const DEFAULT_CURRENCY: &str = "NGN";

/// Price tick for one asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub asset: String,
    pub price: Option<Decimal>,
    /// Server timestamp (`ts`)
    pub timestamp: Option<DateTime<Utc>>,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub spread: Option<Decimal>,
}

/// Batch of candles for one asset and period
#[derive(Debug, Clone, PartialEq)]
pub struct CandleBatch {
    pub asset: String,
    pub timeframe: Option<Timeframe>,
    pub candles: RawCandles,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Tradable instruments announced by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetList {
    pub assets: Vec<String>,
    pub count: usize,
}

/// Quote update; only the asset is interpreted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub asset: String,
    pub raw: Value,
}

/// Account balance update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub currency: String,
    pub balance: Decimal,
}

impl Balance {
    /// Whether the account reports a currency other than the expected one
    pub fn is_unexpected_currency(&self) -> bool {
        self.currency != DEFAULT_CURRENCY
    }
}

/// Notification counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub pending_withdrawal: u64,
    pub achievements: u64,
    pub support: u64,
}

/// A classified application event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Tick(Tick),
    CandleBatch(CandleBatch),
    AssetList(AssetList),
    Quote(Quote),
    Balance(Balance),
    Counters(Counters),
    AuthResult(Value),
    /// Unrecognized or incomplete event, payload kept verbatim
    Unknown { name: String, payload: Value },
}

impl Event {
    /// Short label used for logging and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Tick(_) => "tick",
            Event::CandleBatch(_) => "candles",
            Event::AssetList(_) => "assets",
            Event::Quote(_) => "quotes",
            Event::Balance(_) => "balance",
            Event::Counters(_) => "counters",
            Event::AuthResult(_) => "auth",
            Event::Unknown { .. } => "unknown",
        }
    }

    /// Asset symbols this event reveals
    pub fn asset_symbols(&self) -> Vec<&str> {
        match self {
            Event::Tick(t) => vec![t.asset.as_str()],
            Event::CandleBatch(c) => vec![c.asset.as_str()],
            Event::Quote(q) => vec![q.asset.as_str()],
            Event::AssetList(list) => list.assets.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}
