//! Bounded signal history
//!
//! Append-only log with FIFO eviction. Reads take a shared lock, appends an
//! exclusive one.

use super::{Direction, Signal};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;

/// Default number of signals kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Aggregate figures over the retained signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total: usize,
    pub buys: usize,
    pub sells: usize,
    /// Mean confidence, 0 when empty
    pub average_confidence: f64,
}

/// Thread-safe bounded signal log
#[derive(Debug)]
pub struct SignalHistory {
    capacity: usize,
    entries: RwLock<VecDeque<Signal>>,
}

impl SignalHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&self, signal: Signal) {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(signal);
    }

    /// Up to `n` most recent signals, oldest first
    pub fn recent(&self, n: usize) -> Vec<Signal> {
        let entries = self.entries.read();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    /// All retained signals for `asset`, in insertion order
    pub fn by_asset(&self, asset: &str) -> Vec<Signal> {
        self.entries
            .read()
            .iter()
            .filter(|s| s.asset == asset)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn summary(&self) -> HistorySummary {
        let entries = self.entries.read();
        let total = entries.len();
        if total == 0 {
            return HistorySummary::default();
        }

        let count = |d: Direction| entries.iter().filter(|s| s.direction == d).count();
        let confidence_sum: u64 = entries.iter().map(|s| u64::from(s.confidence.value())).sum();

        HistorySummary {
            total,
            buys: count(Direction::Buy),
            sells: count(Direction::Sell),
            average_confidence: confidence_sum as f64 / total as f64,
        }
    }
}

impl Default for SignalHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
