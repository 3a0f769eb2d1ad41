//! Configuration types for pocket-signals
//!
//! Every section has defaults, so an empty file is a valid configuration.
//! Credentials never live here; see [`crate::protocol::Credentials`].

use crate::candles::Timeframe;
use crate::protocol::ClientProfile;
use crate::signal::DEFAULT_HISTORY_CAPACITY;
use crate::strategy::{TrendFollowing, TrendReversal};
use crate::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Broker WebSocket endpoint and handshake settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// `Origin` header sent with the upgrade request
    #[serde(default = "default_origin")]
    pub origin: String,

    /// `User-Agent` header sent with the upgrade request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How long connect waits for authentication
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_current_url")]
    pub current_url: String,

    #[serde(default = "default_is_chart")]
    pub is_chart: u8,
}

fn default_url() -> String {
    "wss://events-po.com/socket.io/?EIO=4&transport=websocket".to_string()
}
fn default_origin() -> String {
    "https://m.pocketoption.com".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/122.0.0.0 Mobile Safari/537.36"
        .to_string()
}
fn default_connect_timeout_secs() -> u64 {
    15
}
fn default_lang() -> String {
    "en".to_string()
}
fn default_current_url() -> String {
    "cabinet".to_string()
}
fn default_is_chart() -> u8 {
    1
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            lang: default_lang(),
            current_url: default_current_url(),
            is_chart: default_is_chart(),
        }
    }
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Client fields for the `auth` frame
    pub fn client_profile(&self) -> ClientProfile {
        ClientProfile {
            lang: self.lang.clone(),
            current_url: self.current_url.clone(),
            is_chart: self.is_chart,
        }
    }
}

/// Strategy table configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub trend_reversal: TrendReversalConfig,
    #[serde(default)]
    pub trend_following: TrendFollowingConfig,
}

/// Trend reversal strategy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReversalConfig {
    #[serde(default = "default_reversal_timeframe")]
    pub timeframe: Timeframe,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Signals below this confidence are held
    #[serde(default = "default_reversal_min_confidence")]
    pub min_confidence: u8,
}

fn default_true() -> bool {
    true
}
fn default_reversal_timeframe() -> Timeframe {
    Timeframe::from("5m")
}
fn default_reversal_min_confidence() -> u8 {
    TrendReversal::DEFAULT_MIN_CONFIDENCE
}

impl Default for TrendReversalConfig {
    fn default() -> Self {
        Self {
            timeframe: default_reversal_timeframe(),
            enabled: true,
            min_confidence: default_reversal_min_confidence(),
        }
    }
}

/// Trend following strategy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendFollowingConfig {
    /// One strategy instance per timeframe
    #[serde(default = "default_following_timeframes")]
    pub timeframes: Vec<Timeframe>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_following_min_confidence")]
    pub min_confidence: u8,
}

fn default_following_timeframes() -> Vec<Timeframe> {
    ["1m", "2m", "3m"].into_iter().map(Timeframe::from).collect()
}
fn default_following_min_confidence() -> u8 {
    TrendFollowing::DEFAULT_MIN_CONFIDENCE
}

impl Default for TrendFollowingConfig {
    fn default() -> Self {
        Self {
            timeframes: default_following_timeframes(),
            enabled: true,
            min_confidence: default_following_min_confidence(),
        }
    }
}

/// Signal history and asset discovery limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsConfig {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Maximum symbols in a discovered-assets snapshot
    #[serde(default = "default_asset_snapshot_limit")]
    pub asset_snapshot_limit: usize,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}
fn default_asset_snapshot_limit() -> usize {
    50
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            asset_snapshot_limit: default_asset_snapshot_limit(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus exporter port; disabled when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
