//! Asset discovery
//!
//! Process-wide set of asset symbols seen on the wire. Grows monotonically;
//! nothing is ever evicted.

use crate::router::Event;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashSet};

/// Default maximum symbols handed out per snapshot
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 50;

/// Placeholder symbol the upstream feed sends for an unnamed asset
const UNKNOWN_SYMBOL: &str = "unknown";

/// Symbols in first-observed order
#[derive(Debug, Default)]
struct KnownAssets {
    order: Vec<String>,
    members: HashSet<String>,
}

impl KnownAssets {
    fn insert(&mut self, symbol: &str) -> bool {
        if self.members.contains(symbol) {
            return false;
        }
        self.members.insert(symbol.to_string());
        self.order.push(symbol.to_string());
        true
    }
}

/// Observed asset symbols and event names
#[derive(Debug)]
pub struct AssetDiscovery {
    snapshot_limit: usize,
    assets: RwLock<KnownAssets>,
    event_names: RwLock<BTreeSet<String>>,
}

impl AssetDiscovery {
    pub fn new(snapshot_limit: usize) -> Self {
        Self {
            snapshot_limit,
            assets: RwLock::new(KnownAssets::default()),
            event_names: RwLock::new(BTreeSet::new()),
        }
    }

    /// Record the symbols an event reveals. Returns whether the set grew.
    pub fn observe(&self, event: &Event) -> bool {
        let symbols: Vec<&str> = event
            .asset_symbols()
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != UNKNOWN_SYMBOL)
            .collect();
        if symbols.is_empty() {
            return false;
        }

        // Most events repeat known symbols; check under the read lock first
        {
            let assets = self.assets.read();
            if symbols.iter().all(|s| assets.members.contains(*s)) {
                return false;
            }
        }

        let mut assets = self.assets.write();
        let added = symbols.into_iter().filter(|s| assets.insert(s)).count();
        if added > 0 {
            tracing::debug!(added, total = assets.order.len(), "Discovered new assets");
        }
        added > 0
    }

    /// Record a received event name
    pub fn observe_event_name(&self, name: &str) {
        if self.event_names.read().contains(name) {
            return;
        }
        if self.event_names.write().insert(name.to_string()) {
            tracing::debug!(event = name, "First occurrence of event");
        }
    }

    /// The first symbols observed, up to the snapshot limit
    pub fn snapshot(&self) -> Vec<String> {
        self.assets
            .read()
            .order
            .iter()
            .take(self.snapshot_limit)
            .cloned()
            .collect()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.assets.read().members.contains(symbol)
    }

    pub fn observed_event_names(&self) -> Vec<String> {
        self.event_names.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.assets.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.read().order.is_empty()
    }
}

impl Default for AssetDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::classify;
    use serde_json::json;

    #[test]
    fn test_observes_tick_and_candles() {
        let discovery = AssetDiscovery::default();
        assert!(discovery.observe(&classify("tick", &json!({"asset": "EURUSD", "price": 1.1}))));
        assert!(discovery.observe(&classify(
            "candles",
            &json!({"asset": "GBPUSD", "period": "1m", "candles": []})
        )));
        assert_eq!(discovery.snapshot(), vec!["EURUSD", "GBPUSD"]);
    }

    #[test]
    fn test_repeat_symbol_does_not_grow() {
        let discovery = AssetDiscovery::default();
        let tick = classify("tick", &json!({"asset": "EURUSD", "price": 1.1}));
        assert!(discovery.observe(&tick));
        assert!(!discovery.observe(&tick));
        assert_eq!(discovery.len(), 1);
    }

    #[test]
    fn test_asset_list_and_quotes() {
        let discovery = AssetDiscovery::default();
        discovery.observe(&classify("assets", &json!(["A", "B", "C"])));
        discovery.observe(&classify("quotes", &json!({"asset": "D"})));
        assert_eq!(discovery.len(), 4);
        assert!(discovery.contains("D"));
    }

    #[test]
    fn test_ignores_placeholder_symbols() {
        let discovery = AssetDiscovery::default();
        discovery.observe(&classify("assets", &json!({"instruments": ["", "unknown"]})));
        assert!(discovery.is_empty());
    }

    #[test]
    fn test_balance_reveals_nothing() {
        let discovery = AssetDiscovery::default();
        assert!(!discovery.observe(&classify("balance", &json!({"balance": 10}))));
    }

    #[test]
    fn test_snapshot_capped() {
        let discovery = AssetDiscovery::new(50);
        let assets: Vec<String> = (0..80).map(|i| format!("ASSET{i:03}")).collect();
        discovery.observe(&classify("assets", &json!(assets)));
        assert_eq!(discovery.len(), 80);
        assert_eq!(discovery.snapshot().len(), 50);
    }

    #[test]
    fn test_snapshot_keeps_first_observed() {
        let discovery = AssetDiscovery::new(2);
        discovery.observe(&classify("tick", &json!({"asset": "ZZZ", "price": 1.0})));
        discovery.observe(&classify("tick", &json!({"asset": "YYY", "price": 1.0})));
        assert_eq!(discovery.snapshot(), vec!["ZZZ", "YYY"]);

        assert!(discovery.observe(&classify("tick", &json!({"asset": "AAA", "price": 1.0}))));
        assert_eq!(discovery.snapshot(), vec!["ZZZ", "YYY"]);
        assert_eq!(discovery.len(), 3);
    }

    #[test]
    fn test_event_names_recorded_once() {
        let discovery = AssetDiscovery::default();
        discovery.observe_event_name("tick");
        discovery.observe_event_name("tick");
        discovery.observe_event_name("mystery");
        assert_eq!(discovery.observed_event_names(), vec!["mystery", "tick"]);
    }
}
