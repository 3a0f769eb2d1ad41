//! WebSocket transport
//!
//! A single connection with a single writer. No reconnection: a dropped
//! connection is reported once and the caller decides what happens next.

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsMessage};
