//! pocket-signals: market-data ingestion and signal pipeline for the
//! PocketOption WebSocket feed
//!
//! This library provides the core components for:
//! - Frame codec and session state machine for the Socket.IO style protocol
//! - Event classification into typed market events
//! - Candle aggregation from positional and keyed encodings
//! - Timeframe strategies (trend following, trend reversal)
//! - Bounded signal history and asset discovery
//! - Live WebSocket session and offline replay
//! - Structured logging and Prometheus metrics

pub mod candles;
pub mod cli;
pub mod config;
pub mod market;
pub mod pipeline;
pub mod protocol;
pub mod router;
pub mod signal;
pub mod strategy;
pub mod telemetry;
pub mod ws;
