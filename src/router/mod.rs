//! Message routing
//!
//! Classifies application events into typed, normalized domain events.
//! Payload shape differences (list vs object) are resolved here once.

mod classify;
mod types;

pub use classify::classify;
pub use types::{
    AssetList, Balance, CandleBatch, Counters, Event, Quote, Tick, DEFAULT_CURRENCY,
};
