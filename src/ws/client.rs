//! Single-connection WebSocket client
//!
//! One background task owns the socket. Inbound frames are forwarded on an
//! `mpsc` channel; outbound text goes through a second channel so the task
//! remains the only writer.

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{ORIGIN, USER_AGENT};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

/// Capacity of the outbound channel
const OUTBOUND_CAPACITY: usize = 256;

/// WebSocket client without reconnection
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Build the upgrade request with the configured headers
    pub fn request(&self) -> Result<Request, WsError> {
        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| WsError::InvalidRequest(e.to_string()))?;

        let headers = request.headers_mut();
        if let Some(origin) = &self.config.origin {
            headers.insert(ORIGIN, header_value(origin)?);
        }
        if let Some(user_agent) = &self.config.user_agent {
            headers.insert(USER_AGENT, header_value(user_agent)?);
        }

        Ok(request)
    }

    /// Connect and return both a receiver and a sender for bidirectional communication
    ///
    /// The connection lives until the server closes it, the transport fails,
    /// the outbound sender is dropped, or `cancel` fires. Every one of those
    /// ends with a single [`WsMessage::Disconnected`].
    pub fn connect_bidirectional(
        &self,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<WsMessage>, mpsc::Sender<String>) {
        let (msg_tx, msg_rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (send_tx, send_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let request = self.request();
        let url = self.config.url.clone();

        tokio::spawn(async move {
            let reason = match request {
                Ok(request) => {
                    match Self::connect_and_stream(request, &url, &msg_tx, send_rx, &cancel).await {
                        Ok(reason) => reason,
                        Err(e) => {
                            tracing::error!(error = %e, "WebSocket connection failed");
                            e.to_string()
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Could not build WebSocket request");
                    e.to_string()
                }
            };
            let _ = msg_tx.send(WsMessage::Disconnected { reason }).await;
        });

        (msg_rx, send_tx)
    }

    /// Connect and pump frames until the connection ends. Returns the reason
    /// for a clean end.
    async fn connect_and_stream(
        request: Request,
        url: &str,
        tx: &mpsc::Sender<WsMessage>,
        mut send_rx: mpsc::Receiver<String>,
        cancel: &CancellationToken,
    ) -> Result<String, WsError> {
        tracing::info!(url = %url, "Connecting to WebSocket");

        let (ws_stream, response) = tokio::select! {
            result = connect_async(request) => {
                result.map_err(|e| WsError::ConnectionFailed(e.to_string()))?
            }
            _ = cancel.cancelled() => return Ok("cancelled".to_string()),
        };

        let (mut write, mut read) = ws_stream.split();

        tracing::info!(status = %response.status(), "WebSocket connected");

        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok("receiver dropped".to_string());
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                return Ok("receiver dropped".to_string());
                            }
                        }
                        Some(Ok(Message::Binary(data))) => {
                            if tx.send(WsMessage::Binary(data)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                return Ok("receiver dropped".to_string());
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(frame = ?frame, "Received close frame");
                            return Ok("closed by server".to_string());
                        }
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                        _ => {}
                    }
                }

                msg = send_rx.recv() => {
                    match msg {
                        Some(text) => {
                            write.send(Message::Text(text)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        None => {
                            let _ = write.send(Message::Close(None)).await;
                            return Ok("sender dropped".to_string());
                        }
                    }
                }

                _ = cancel.cancelled() => {
                    tracing::info!("WebSocket cancelled, closing");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok("cancelled".to_string());
                }
            }
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, WsError> {
    HeaderValue::from_str(value).map_err(|e| WsError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ws_client_creation() {
        let client = WsClient::with_url("wss://example.com");
        assert_eq!(client.url(), "wss://example.com");
    }

    #[test]
    fn test_request_carries_headers() {
        let client = WsClient::new(
            WsConfig::new("wss://example.com/socket.io/?EIO=4&transport=websocket")
                .origin("https://m.example.com")
                .user_agent("pocket-signals/0.1"),
        );
        let request = client.request().unwrap();
        assert_eq!(request.headers()[ORIGIN], "https://m.example.com");
        assert_eq!(request.headers()[USER_AGENT], "pocket-signals/0.1");
    }

    #[test]
    fn test_request_rejects_bad_url() {
        let client = WsClient::with_url("not a url");
        assert!(matches!(client.request(), Err(WsError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_rejects_bad_header() {
        let client = WsClient::new(WsConfig::new("wss://example.com").origin("bad\nvalue"));
        assert!(matches!(client.request(), Err(WsError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_ws_client_connection_failure() {
        let client = WsClient::with_url("ws://127.0.0.1:1");
        let (mut rx, _tx) = client.connect_bidirectional(CancellationToken::new());

        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("Test timed out");
        assert!(matches!(msg, Some(WsMessage::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_ws_client_cancel_before_connect() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = WsClient::with_url("ws://127.0.0.1:1");
        let (mut rx, _tx) = client.connect_bidirectional(cancel);

        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("Test timed out");
        assert!(matches!(msg, Some(WsMessage::Disconnected { .. })));
    }
}
