//! Market discovery
//!
//! Tracks which instruments the broker streams so the configuration side can
//! offer them.

mod discovery;

pub use discovery::{AssetDiscovery, DEFAULT_SNAPSHOT_LIMIT};
