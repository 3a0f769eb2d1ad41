//! Signal types and history

mod history;
mod types;

pub use history::{HistorySummary, SignalHistory, DEFAULT_HISTORY_CAPACITY};
pub use types::{Analysis, Confidence, Direction, Signal};
