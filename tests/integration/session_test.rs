//! Live session tests against an in-process WebSocket server

use futures_util::{SinkExt, StreamExt};
use pocket_signals::config::{Config, ConnectionConfig};
use pocket_signals::pipeline::{Pipeline, PresentationEvent, Session, SessionError, TracingSink};
use pocket_signals::protocol::{decode, Credentials, Frame, SessionState, PONG};
use pocket_signals::signal::Direction;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};

const OPEN: &str = r#"0{"sid":"srv-1","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;

/// How the fake broker behaves after sending the namespace ack
#[derive(Debug, Clone, Copy)]
enum Script {
    /// Authenticate, ping, then stream candles and a tick
    Stream,
    /// Never acknowledge the auth frame
    Silent,
    /// Authenticate, then close the connection
    CloseAfterAuth,
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text,
            Some(Ok(_)) => continue,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

async fn drain_until_close(ws: &mut WebSocketStream<TcpStream>, received: &mut Vec<String>) {
    while let Some(Ok(message)) = ws.next().await {
        match message {
            Message::Text(text) => received.push(text),
            Message::Close(_) => break,
            _ => {}
        }
    }
}

fn candles_frame() -> String {
    let candles: Vec<String> = (0..20)
        .map(|i| {
            let close = 1.05 + i as f64 * 0.004;
            format!("[{},{},{},{},{},3]", i * 60, close, close, close, close)
        })
        .collect();
    format!(
        r#"42["candles",{{"asset":"EURUSD_otc","period":"1m","candles":[{}]}}]"#,
        candles.join(",")
    )
}

/// Serve one connection. Returns the URL and a handle yielding every text
/// frame the client sent.
async fn start_server(script: Script) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!(
        "ws://{}/socket.io/?EIO=4&transport=websocket",
        listener.local_addr().unwrap()
    );

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut received = Vec::new();

        ws.send(Message::Text(OPEN.to_string())).await.unwrap();
        ws.send(Message::Text("40".to_string())).await.unwrap();
        received.push(next_text(&mut ws).await);

        match script {
            Script::Silent => {}
            Script::CloseAfterAuth => {
                ws.send(Message::Text(r#"42["auth/success",{}]"#.to_string()))
                    .await
                    .unwrap();
                tokio::time::sleep(Duration::from_millis(200)).await;
                let _ = ws.close(None).await;
                return received;
            }
            Script::Stream => {
                ws.send(Message::Text(r#"42["auth/success",{}]"#.to_string()))
                    .await
                    .unwrap();
                ws.send(Message::Text("2".to_string())).await.unwrap();
                received.push(next_text(&mut ws).await);
                ws.send(Message::Text(candles_frame())).await.unwrap();
                ws.send(Message::Text(
                    r#"42["tick",{"asset":"GBPUSD","price":1.27}]"#.to_string(),
                ))
                .await
                .unwrap();
            }
        }

        drain_until_close(&mut ws, &mut received).await;
        received
    });

    (url, handle)
}

fn connection(url: String, timeout_secs: u64) -> ConnectionConfig {
    ConnectionConfig {
        url,
        connect_timeout_secs: timeout_secs,
        ..Default::default()
    }
}

fn credentials() -> Credentials {
    Credentials::new("session-abc", "42").unwrap()
}

#[tokio::test]
async fn test_session_streams_signals() {
    let (url, server) = start_server(Script::Stream).await;
    let (present_tx, mut presentation) = mpsc::unbounded_channel::<PresentationEvent>();
    let pipeline =
        Pipeline::from_config(&Config::default(), Arc::new(present_tx), Arc::new(TracingSink));

    let session = Session::connect(&connection(url, 5), &credentials(), pipeline)
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Authenticated);

    let signal = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match presentation.recv().await {
                Some(PresentationEvent::Signal(signal)) => return signal,
                Some(PresentationEvent::Status(_)) => continue,
                None => panic!("presentation channel closed"),
            }
        }
    })
    .await
    .expect("no signal received");

    assert_eq!(signal.asset, "EURUSD_otc");
    assert_eq!(signal.direction, Direction::Buy);
    assert_eq!(session.history().len(), 1);

    // The tick follows the candles on the same stream
    tokio::time::timeout(Duration::from_secs(5), async {
        while !session.discovery().contains("GBPUSD") {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("tick not processed");

    session.disconnect().await;
    let received = server.await.unwrap();

    match decode(&received[0]) {
        Frame::Event { name, payload } => {
            assert_eq!(name, "auth");
            assert_eq!(
                payload,
                json!({
                    "sessionToken": "session-abc",
                    "uid": "42",
                    "lang": "en",
                    "currentUrl": "cabinet",
                    "isChart": 1
                })
            );
        }
        other => panic!("expected auth frame, got {other:?}"),
    }
    assert_eq!(received[1], PONG);
}

#[tokio::test]
async fn test_session_auth_timeout() {
    let (url, server) = start_server(Script::Silent).await;
    let pipeline =
        Pipeline::from_config(&Config::default(), Arc::new(TracingSink), Arc::new(TracingSink));

    let result = Session::connect(&connection(url, 1), &credentials(), pipeline).await;
    assert!(matches!(
        result,
        Err(SessionError::ConnectTimeout(d)) if d == Duration::from_secs(1)
    ));

    // Exactly one auth frame, nothing else
    let received = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not observe close")
        .unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn test_session_closes_on_transport_close() {
    let (url, server) = start_server(Script::CloseAfterAuth).await;
    let (present_tx, mut presentation) = mpsc::unbounded_channel::<PresentationEvent>();
    let pipeline =
        Pipeline::from_config(&Config::default(), Arc::new(present_tx), Arc::new(TracingSink));

    let session = Session::connect(&connection(url, 5), &credentials(), pipeline)
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), session.closed())
        .await
        .expect("session did not close");
    assert_eq!(session.state(), SessionState::Closed);

    let mut statuses = Vec::new();
    while let Ok(event) = presentation.try_recv() {
        if let PresentationEvent::Status(state) = event {
            statuses.push(state);
        }
    }
    assert_eq!(statuses.last(), Some(&SessionState::Closed));
    assert!(statuses.contains(&SessionState::Authenticated));

    session.disconnect().await;
    server.await.unwrap();
}
