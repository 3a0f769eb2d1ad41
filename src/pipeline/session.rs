//! Live broker session
//!
//! One reader task owns the socket stream and runs every frame through the
//! [`FrameProcessor`]. A keepalive task watches for server silence. Both
//! share only the outbound channel, the state watch and the last-frame
//! instant.

use super::driver::FrameProcessor;
use super::processor::Pipeline;
use crate::config::ConnectionConfig;
use crate::market::AssetDiscovery;
use crate::protocol::{
    ConnectionInfo, CredentialProvider, CredentialsError, SessionState, SessionStateMachine,
};
use crate::signal::SignalHistory;
use crate::ws::{WsClient, WsConfig, WsError, WsMessage};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Errors surfaced by [`Session::connect`]
#[derive(Debug, Error)]
pub enum SessionError {
    /// Credentials missing or empty; no I/O was attempted
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(#[from] CredentialsError),

    /// Authentication not reached in time
    #[error("Not authenticated within {0:?}")]
    ConnectTimeout(Duration),

    /// Connection closed before authentication completed
    #[error("Connection closed before authentication")]
    ClosedBeforeAuth,

    #[error(transparent)]
    Transport(#[from] WsError),
}

/// A connected, authenticated session
pub struct Session {
    state: watch::Receiver<SessionState>,
    history: Arc<SignalHistory>,
    discovery: Arc<AssetDiscovery>,
    cancel: CancellationToken,
    reader: Option<JoinHandle<FrameProcessor>>,
}

impl Session {
    /// Open the transport, complete the handshake and authenticate.
    ///
    /// Credentials are resolved before any I/O. Fails with
    /// [`SessionError::ConnectTimeout`] when authentication does not finish
    /// within `config.connect_timeout()`.
    pub async fn connect(
        config: &ConnectionConfig,
        credentials: &dyn CredentialProvider,
        pipeline: Pipeline,
    ) -> Result<Self, SessionError> {
        let credentials = credentials.credentials()?;

        let client = WsClient::new(
            WsConfig::new(&config.url)
                .origin(&config.origin)
                .user_agent(&config.user_agent),
        );
        client.request()?;

        let machine = SessionStateMachine::new(credentials, config.client_profile());
        let mut processor = FrameProcessor::new(machine, pipeline);
        processor.pipeline().announce_strategy_flags();
        processor.request_connect();

        let history = processor.pipeline().history().clone();
        let discovery = processor.pipeline().discovery().clone();

        let cancel = CancellationToken::new();
        let (inbound, outbound) = client.connect_bidirectional(cancel.child_token());
        let (state_tx, state_rx) = watch::channel(processor.state());

        let reader = tokio::spawn(read_loop(
            processor,
            inbound,
            outbound,
            state_tx,
            cancel.clone(),
        ));

        let mut session = Self {
            state: state_rx,
            history,
            discovery,
            cancel,
            reader: Some(reader),
        };

        let timeout = config.connect_timeout();
        let mut state = session.state.clone();
        let reached = tokio::time::timeout(
            timeout,
            state.wait_for(|s| matches!(s, SessionState::Authenticated | SessionState::Closed)),
        )
        .await
        .map(|result| result.map(|s| *s));

        match reached {
            Ok(Ok(SessionState::Authenticated)) => {
                tracing::info!("Session authenticated");
                Ok(session)
            }
            Ok(_) => {
                session.shutdown().await;
                Err(SessionError::ClosedBeforeAuth)
            }
            Err(_) => {
                tracing::error!(timeout = ?timeout, "Authentication timed out");
                session.shutdown().await;
                Err(SessionError::ConnectTimeout(timeout))
            }
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn history(&self) -> &Arc<SignalHistory> {
        &self.history
    }

    pub fn discovery(&self) -> &Arc<AssetDiscovery> {
        &self.discovery
    }

    /// Resolve once the session reaches `Closed`
    pub async fn closed(&self) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s == SessionState::Closed).await;
    }

    /// Close the transport and wait for the reader to finish
    pub async fn disconnect(mut self) {
        self.shutdown().await;
    }

    async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(reader) = self.reader.take() {
            if let Err(e) = reader.await {
                tracing::error!(error = %e, "Session reader task failed");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owns the inbound stream until the transport ends
async fn read_loop(
    mut processor: FrameProcessor,
    mut inbound: mpsc::Receiver<WsMessage>,
    outbound: mpsc::Sender<String>,
    state_tx: watch::Sender<SessionState>,
    cancel: CancellationToken,
) -> FrameProcessor {
    let last_frame = Arc::new(RwLock::new(Instant::now()));

    while let Some(message) = inbound.recv().await {
        match message {
            WsMessage::Connected => tracing::debug!("Transport open, awaiting handshake"),
            WsMessage::Text(text) => {
                *last_frame.write() = Instant::now();

                let outcome = processor.handle_text(&text);
                let transition = outcome.transition;

                if let Some(frame) = transition.outbound {
                    if outbound.send(frame).await.is_err() {
                        tracing::warn!("Outbound channel closed, frame dropped");
                    }
                }

                if transition.from != transition.to {
                    state_tx.send_replace(transition.to);

                    if transition.to == SessionState::Open {
                        if let Some(info) = processor.machine().connection_info() {
                            tokio::spawn(keepalive(
                                info.clone(),
                                state_tx.subscribe(),
                                last_frame.clone(),
                                processor.pipeline().discovery().clone(),
                                cancel.clone(),
                            ));
                        }
                    }
                }
            }
            WsMessage::Binary(data) => {
                tracing::debug!(len = data.len(), "Ignoring binary frame");
            }
            WsMessage::Disconnected { reason } => {
                tracing::info!(reason = %reason, "Transport disconnected");
                break;
            }
        }
    }

    processor.transport_closed();
    state_tx.send_replace(SessionState::Closed);
    cancel.cancel();
    processor
}

/// Upper bound on the keepalive tick, whatever the server advertises
const MAX_KEEPALIVE_PERIOD_MS: u64 = 10 * 60 * 1000;

/// Liveness observer. Reads shared state only, never changes it.
async fn keepalive(
    info: ConnectionInfo,
    state: watch::Receiver<SessionState>,
    last_frame: Arc<RwLock<Instant>>,
    discovery: Arc<AssetDiscovery>,
    cancel: CancellationToken,
) {
    let period = Duration::from_millis(info.ping_interval.clamp(1, MAX_KEEPALIVE_PERIOD_MS));
    let silence_limit = Duration::from_millis(info.ping_interval.saturating_add(info.ping_timeout));

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let current = *state.borrow();
                if current == SessionState::Closed {
                    break;
                }

                let silent = last_frame.read().elapsed();
                if silent > silence_limit {
                    tracing::warn!(
                        state = %current,
                        silent_ms = silent.as_millis() as u64,
                        "No frames from server within ping window"
                    );
                } else {
                    tracing::debug!(
                        state = %current,
                        assets = discovery.len(),
                        events = ?discovery.observed_event_names(),
                        "Keepalive"
                    );
                }
            }
        }
    }

    tracing::debug!("Keepalive stopped");
}
