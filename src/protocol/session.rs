//! Session state machine
//!
//! Drives one connection from the transport handshake through
//! authentication. The machine is pure: it consumes decoded frames and
//! returns the outbound frame (if any) the caller must write.

use super::auth::{AuthPayload, ClientProfile, Credentials};
use super::frame::{self, ConnectionInfo, Frame, PONG};
use serde::Serialize;
use std::fmt;

/// Event name acknowledging a successful `auth`
pub const AUTH_SUCCESS_EVENT: &str = "auth/success";
/// Application-level keepalive probe
pub const PING_SERVER_EVENT: &str = "ping-server";

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Open,
    NamespaceConnected,
    AuthPending,
    Authenticated,
    Closed,
}

impl SessionState {
    /// States in which the server's keepalive probes are answered
    pub fn answers_pings(&self) -> bool {
        matches!(
            self,
            SessionState::Open
                | SessionState::NamespaceConnected
                | SessionState::AuthPending
                | SessionState::Authenticated
        )
    }

    /// Numeric code published as a metrics gauge
    pub fn code(&self) -> u8 {
        match self {
            SessionState::Idle => 0,
            SessionState::Connecting => 1,
            SessionState::Open => 2,
            SessionState::NamespaceConnected => 3,
            SessionState::AuthPending => 4,
            SessionState::Authenticated => 5,
            SessionState::Closed => 6,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::NamespaceConnected => "namespace_connected",
            SessionState::AuthPending => "auth_pending",
            SessionState::Authenticated => "authenticated",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Result of feeding one trigger into the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
    /// Frame the caller must send, if any
    pub outbound: Option<String>,
}

impl Transition {
    fn stay(state: SessionState) -> Self {
        Self {
            from: state,
            to: state,
            outbound: None,
        }
    }

    /// Whether the state changed
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Connection/session state machine
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    state: SessionState,
    connection: Option<ConnectionInfo>,
    authenticated: bool,
    credentials: Credentials,
    profile: ClientProfile,
}

impl SessionStateMachine {
    pub fn new(credentials: Credentials, profile: ClientProfile) -> Self {
        Self {
            state: SessionState::Idle,
            connection: None,
            authenticated: false,
            credentials,
            profile,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Handshake parameters captured from the `0{...}` frame
    pub fn connection_info(&self) -> Option<&ConnectionInfo> {
        self.connection.as_ref()
    }

    /// The `42["auth", {...}]` frame for this session's credentials
    pub fn auth_frame(&self) -> String {
        let payload = AuthPayload::new(&self.credentials, &self.profile);
        // AuthPayload holds only strings and integers
        let value = serde_json::to_value(payload).unwrap_or(serde_json::Value::Null);
        frame::encode("auth", &value)
    }

    /// Begin a connection. Valid from `Idle`, or from `Closed` which restarts
    /// at `Idle` first.
    pub fn request_connect(&mut self) -> Transition {
        let from = self.state;
        match from {
            SessionState::Idle | SessionState::Closed => {
                self.connection = None;
                self.authenticated = false;
                self.state = SessionState::Connecting;
                tracing::info!(from = %from, "Connect requested");
                Transition {
                    from,
                    to: self.state,
                    outbound: None,
                }
            }
            _ => {
                tracing::debug!(state = %from, "Connect requested while already active, ignoring");
                Transition::stay(from)
            }
        }
    }

    /// Feed one decoded frame
    pub fn handle_frame(&mut self, frame: &Frame) -> Transition {
        let from = self.state;

        match (from, frame) {
            (SessionState::Connecting, Frame::ConnectionInfo(info)) => {
                tracing::info!(
                    sid = ?info.sid,
                    ping_interval = info.ping_interval,
                    ping_timeout = info.ping_timeout,
                    "Connection established"
                );
                self.connection = Some(info.clone());
                self.state = SessionState::Open;
                Transition {
                    from,
                    to: self.state,
                    outbound: None,
                }
            }
            (SessionState::Open, Frame::NamespaceAck) => {
                self.state = SessionState::NamespaceConnected;
                tracing::info!("Namespace connected, sending authentication");
                self.state = SessionState::AuthPending;
                Transition {
                    from,
                    to: self.state,
                    outbound: Some(self.auth_frame()),
                }
            }
            (state, Frame::Ping) if state.answers_pings() => {
                tracing::debug!("Answering ping");
                Transition {
                    from,
                    to: from,
                    outbound: Some(PONG.to_string()),
                }
            }
            (state, Frame::Event { name, .. }) if name == PING_SERVER_EVENT => {
                if state.answers_pings() {
                    tracing::debug!("Answering ping-server");
                    Transition {
                        from,
                        to: from,
                        outbound: Some(PONG.to_string()),
                    }
                } else {
                    self.ignored(frame)
                }
            }
            (SessionState::AuthPending, Frame::Event { name, .. }) if name == AUTH_SUCCESS_EVENT => {
                self.state = SessionState::Authenticated;
                self.authenticated = true;
                tracing::info!("Authentication successful");
                Transition {
                    from,
                    to: self.state,
                    outbound: None,
                }
            }
            // Application events flow freely once authenticated
            (SessionState::Authenticated, Frame::Event { .. }) => Transition::stay(from),
            _ => self.ignored(frame),
        }
    }

    /// Transport error or close: always ends in `Closed`
    pub fn transport_closed(&mut self) -> Transition {
        let from = self.state;
        self.state = SessionState::Closed;
        self.authenticated = false;
        if from != SessionState::Closed {
            tracing::info!(from = %from, "Session closed");
        }
        Transition {
            from,
            to: self.state,
            outbound: None,
        }
    }

    fn ignored(&self, frame: &Frame) -> Transition {
        tracing::debug!(
            state = %self.state,
            frame = frame.kind(),
            "No transition for frame, state unchanged"
        );
        Transition::stay(self.state)
    }
}
