//! Ingestion pipeline
//!
//! Wires the protocol, router, candle aggregation and strategies together
//! and pushes results to the presentation and configuration sinks.

mod driver;
mod processor;
mod session;
mod sink;

pub use driver::{FrameOutcome, FrameProcessor};
pub use processor::Pipeline;
pub use session::{Session, SessionError};
pub use sink::{
    ConfigUpdate, ConfigurationSink, PresentationEvent, PresentationSink, TracingSink,
};
