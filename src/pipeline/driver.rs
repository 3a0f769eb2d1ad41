//! Raw frame driver
//!
//! Couples the session state machine with the event pipeline. Transport
//! agnostic: the live session and offline replay both feed it text frames.

use super::processor::Pipeline;
use crate::protocol::{
    decode, Frame, SessionState, SessionStateMachine, Transition, PING_SERVER_EVENT,
};
use crate::signal::Signal;
use crate::telemetry::{self, LatencyMetric};
use std::time::Instant;

/// Result of one inbound frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub transition: Transition,
    /// Actionable signal produced by the frame, if any
    pub signal: Option<Signal>,
}

/// Decode → session → route → aggregate → analyze, one frame at a time
pub struct FrameProcessor {
    machine: SessionStateMachine,
    pipeline: Pipeline,
}

impl FrameProcessor {
    pub fn new(machine: SessionStateMachine, pipeline: Pipeline) -> Self {
        Self { machine, pipeline }
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn request_connect(&mut self) -> Transition {
        let transition = self.machine.request_connect();
        self.publish(&transition);
        transition
    }

    /// Handle one text frame. Application events reach the pipeline only
    /// once the session is authenticated.
    pub fn handle_text(&mut self, raw: &str) -> FrameOutcome {
        let started = Instant::now();

        let frame = decode(raw);
        telemetry::metrics::record_frame(frame.kind());

        let transition = self.machine.handle_frame(&frame);
        self.publish(&transition);

        let signal = match &frame {
            Frame::Event { name, payload }
                if transition.from == SessionState::Authenticated && name != PING_SERVER_EVENT =>
            {
                self.pipeline.handle_event(name, payload)
            }
            Frame::Event { name, .. } if !transition.changed() && name != PING_SERVER_EVENT => {
                tracing::debug!(
                    event = %name,
                    state = %transition.from,
                    "Event before authentication, ignoring"
                );
                None
            }
            _ => None,
        };

        telemetry::record_latency(LatencyMetric::FrameHandling, started.elapsed());

        FrameOutcome { transition, signal }
    }

    /// Transport closed or failed
    pub fn transport_closed(&mut self) -> Transition {
        let transition = self.machine.transport_closed();
        self.publish(&transition);
        transition
    }

    fn publish(&self, transition: &Transition) {
        if transition.changed() {
            telemetry::metrics::record_session_state(transition.to);
            self.pipeline.report_status(transition.to);
        }
    }
}
