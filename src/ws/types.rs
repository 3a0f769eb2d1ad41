//! WebSocket types and configuration

use thiserror::Error;

/// WebSocket client configuration
#[derive(Debug, Clone, Default)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// `Origin` header for the upgrade request
    pub origin: Option<String>,
    /// `User-Agent` header for the upgrade request
    pub user_agent: Option<String>,
    /// Capacity of the inbound message channel
    pub channel_capacity: usize,
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            origin: None,
            user_agent: None,
            channel_capacity: 1024,
        }
    }

    /// Set the `Origin` header
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set the `User-Agent` header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// WebSocket message types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
    /// Connection established
    Connected,
    /// Connection closed or failed; no reconnection follows
    Disconnected { reason: String },
}

/// WebSocket errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WsError {
    /// URL or header could not form an upgrade request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
}
