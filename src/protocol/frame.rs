//! Frame codec for the Engine.IO/Socket.IO style text protocol
//!
//! Every transport text message is one frame. The leading digits select the
//! frame kind; event frames carry a JSON array `[eventName, payload]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pong reply, sent in answer to a ping frame or a `ping-server` event
pub const PONG: &str = "3";

const CONNECTION_INFO_PREFIX: &str = "0";
const NAMESPACE_ACK_PREFIX: &str = "40";
const EVENT_PREFIX: &str = "42";
const PING: &str = "2";

/// Handshake parameters announced by the server in the `0{...}` frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    /// Session id assigned by the server, when it sends one
    #[serde(default)]
    pub sid: Option<String>,
    /// Keepalive interval in milliseconds
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    /// Keepalive timeout in milliseconds
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
}

fn default_ping_interval() -> u64 {
    25_000
}
fn default_ping_timeout() -> u64 {
    20_000
}

/// A decoded protocol frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `0{...}` handshake
    ConnectionInfo(ConnectionInfo),
    /// `40` namespace connected
    NamespaceAck,
    /// `2` keepalive probe from the server
    Ping,
    /// `42[name, payload]` application event
    Event { name: String, payload: Value },
    /// Anything else, kept verbatim
    Unknown(String),
}

impl Frame {
    /// Short label used for logging and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::ConnectionInfo(_) => "connection_info",
            Frame::NamespaceAck => "namespace_ack",
            Frame::Ping => "ping",
            Frame::Event { .. } => "event",
            Frame::Unknown(_) => "unknown",
        }
    }
}

/// Decode one raw transport message. Never fails: malformed input becomes
/// [`Frame::Unknown`].
pub fn decode(raw: &str) -> Frame {
    if let Some(body) = raw.strip_prefix(EVENT_PREFIX) {
        return decode_event(raw, body);
    }

    if let Some(body) = raw.strip_prefix(NAMESPACE_ACK_PREFIX) {
        // Socket.IO v4 servers may append `{"sid": ...}` to the ack
        if body.is_empty() || body.starts_with('{') {
            return Frame::NamespaceAck;
        }
        return unknown(raw);
    }

    if raw == PING {
        return Frame::Ping;
    }

    if let Some(body) = raw.strip_prefix(CONNECTION_INFO_PREFIX) {
        return match serde_json::from_str::<ConnectionInfo>(body) {
            Ok(info) => Frame::ConnectionInfo(info),
            Err(e) => {
                tracing::warn!(error = %e, preview = %preview(raw), "Malformed handshake frame");
                Frame::Unknown(raw.to_string())
            }
        };
    }

    unknown(raw)
}

fn decode_event(raw: &str, body: &str) -> Frame {
    let items = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            tracing::warn!(preview = %preview(raw), "Event frame is not a JSON array");
            return Frame::Unknown(raw.to_string());
        }
        Err(e) => {
            tracing::warn!(error = %e, preview = %preview(raw), "Failed to parse event frame");
            return Frame::Unknown(raw.to_string());
        }
    };

    let mut items = items.into_iter();
    match items.next() {
        Some(Value::String(name)) => Frame::Event {
            name,
            payload: items.next().unwrap_or(Value::Null),
        },
        _ => {
            tracing::warn!(preview = %preview(raw), "Event frame without a name");
            Frame::Unknown(raw.to_string())
        }
    }
}

fn unknown(raw: &str) -> Frame {
    tracing::debug!(preview = %preview(raw), "Unhandled frame");
    Frame::Unknown(raw.to_string())
}

/// Encode an application event as `42[name, payload]`
pub fn encode(event_name: &str, payload: &Value) -> String {
    let body = Value::Array(vec![Value::String(event_name.to_string()), payload.clone()]);
    format!("{EVENT_PREFIX}{body}")
}

fn preview(raw: &str) -> String {
    raw.chars().take(200).collect()
}
