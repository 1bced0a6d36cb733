/*
[INPUT]:  Test scenarios needing a live WebSocket peer
[OUTPUT]: Local mock OKX WebSocket server and client fixtures
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for okx-ws-adapter tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use okx_ws_adapter::{ChannelMessageHandler, ClientConfig, OkxWebSocket, WebSocketMessage};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

pub const WAIT: Duration = Duration::from_secs(5);
pub const BASE_PATH: &str = "/ws/v5";

type Peers = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<Message>>>>;

/// Mock OKX WebSocket server
///
/// Replies `pong` to every `ping`, records every inbound text frame as
/// `(path, text)` and close frames as `<close:{code}>`.
pub struct MockServer {
    url: String,
    inbound_rx: mpsc::UnboundedReceiver<(String, String)>,
    peers: Peers,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let peers: Peers = Arc::new(Mutex::new(HashMap::new()));

        let peers_for_task = peers.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, inbound_tx.clone(), peers_for_task.clone()));
            }
        });

        Self {
            url: format!("ws://{addr}{BASE_PATH}"),
            inbound_rx,
            peers,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a text frame to the peer connected on `channel` (e.g. "public")
    pub async fn push(&self, channel: &str, text: &str) {
        self.push_message(channel, Message::Text(text.to_string().into()))
            .await;
    }

    pub async fn push_message(&self, channel: &str, message: Message) {
        let sender = self.peer(channel).await;
        sender.send(message).unwrap();
    }

    /// Drop the connection on `channel` without a close handshake
    pub async fn disconnect(&self, channel: &str) {
        let _ = self.peer(channel).await;
        self.peers.lock().await.remove(&channel_path(channel));
    }

    /// Next recorded frame, pings included
    pub async fn next_frame(&mut self) -> (String, String) {
        timeout(WAIT, self.inbound_rx.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("mock server stopped")
    }

    /// Next recorded frame other than `ping`
    pub async fn next_request(&mut self) -> (String, String) {
        loop {
            let (path, text) = self.next_frame().await;
            if text != "ping" {
                return (path, text);
            }
        }
    }

    /// Next request frame parsed as JSON
    pub async fn next_json(&mut self) -> (String, serde_json::Value) {
        let (path, text) = self.next_request().await;
        (path, serde_json::from_str(&text).unwrap())
    }

    /// Assert nothing but pings arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            match tokio::time::timeout_at(deadline, self.inbound_rx.recv()).await {
                Err(_) => return,
                Ok(Some((_, text))) if text == "ping" => continue,
                Ok(other) => panic!("Expected no client frame, got {other:?}"),
            }
        }
    }

    async fn peer(&self, channel: &str) -> mpsc::UnboundedSender<Message> {
        let path = channel_path(channel);
        let lookup = async {
            loop {
                if let Some(sender) = self.peers.lock().await.get(&path) {
                    return sender.clone();
                }
                sleep(Duration::from_millis(10)).await;
            }
        };
        timeout(WAIT, lookup)
            .await
            .unwrap_or_else(|_| panic!("no client connected on {path}"))
    }
}

pub fn channel_path(channel: &str) -> String {
    format!("{BASE_PATH}/{channel}")
}

async fn serve(
    stream: TcpStream,
    inbound_tx: mpsc::UnboundedSender<(String, String)>,
    peers: Peers,
) {
    let mut path = String::new();
    let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        path = request.uri().path().to_string();
        Ok(response)
    };
    let Ok(ws) = accept_hdr_async(stream, callback).await else {
        return;
    };

    let (mut sink, mut source) = ws.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    peers.lock().await.insert(path.clone(), outbound_tx);

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(message) => {
                    if sink.send(message).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            inbound = source.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if text.as_str() == "ping" {
                        let _ = sink.send(Message::Text("pong".to_string().into())).await;
                    }
                    let _ = inbound_tx.send((path.clone(), text.to_string()));
                }
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|frame| u16::from(frame.code)).unwrap_or_default();
                    let _ = inbound_tx.send((path.clone(), format!("<close:{code}>")));
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }
}

/// A TCP listener that accepts connections but never completes a handshake
pub async fn silent_listener() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("ws://{addr}{BASE_PATH}")
}

/// An address nothing listens on
pub async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}{BASE_PATH}")
}

/// Connect a client whose handler forwards into the returned receiver
pub async fn connect_client(
    server: &MockServer,
    config: ClientConfig,
) -> (OkxWebSocket, mpsc::Receiver<WebSocketMessage>) {
    let (handler, receiver) = ChannelMessageHandler::new(16);
    let client = OkxWebSocket::connect_with(server.url(), config, Arc::new(handler))
        .await
        .unwrap();
    (client, receiver)
}

pub async fn recv_message(receiver: &mut mpsc::Receiver<WebSocketMessage>) -> WebSocketMessage {
    timeout(WAIT, receiver.recv())
        .await
        .expect("timed out waiting for a handler callback")
        .expect("handler channel closed")
}
