/*
[INPUT]:  Base URL, channel type, config and message handler
[OUTPUT]: One open socket with read loop, keep-alive and request writes
[POS]:    WebSocket layer - single connection lifecycle
[UPDATE]: When changing framing, liveness tracking or close semantics
*/

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage, Utf8Bytes};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info, info_span, warn};
use url::Url;

use super::codec::{self, Inbound, truncate_for_log};
use super::config::ClientConfig;
use super::dispatch::{MessageKind, dispatch};
use super::handler::MessageHandler;
use super::keepalive;
use crate::error::{OkxError, Result};
use crate::types::{ChannelType, Request, Validate};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Request and message counters of one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub push_data_received: u64,
}

/// One socket bound to one channel type path
///
/// Lifecycle: dialed in [`Session::connect`], open until [`Session::close`]
/// or a fatal read error.
pub struct Session {
    channel_type: ChannelType,
    url: Url,
    writer: Mutex<SplitSink<WsStream, WsMessage>>,
    reader: Mutex<SplitStream<WsStream>>,
    handler: Arc<dyn MessageHandler>,
    ping_interval: Duration,
    span: Span,

    /// Unix time in milliseconds
    last_active: AtomicI64,
    closed: AtomicBool,
    close_signal: CancellationToken,

    requests_sent: AtomicU64,
    responses_received: AtomicU64,
    push_data_received: AtomicU64,
}

impl Session {
    /// Dial `{base_url}/{channel_type}` within the configured timeout
    pub(crate) async fn connect(
        base_url: &Url,
        channel_type: ChannelType,
        config: &ClientConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self> {
        let url = join_path(base_url, channel_type)?;
        let span = info_span!(
            parent: &config.span,
            "okx_ws_session",
            %channel_type,
            url = %url
        );

        let stream = dial(&url, config.dial_timeout)
            .instrument(span.clone())
            .await?;
        let (writer, reader) = stream.split();
        info!(parent: &span, "websocket connected");

        let session = Self {
            channel_type,
            url,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            handler,
            ping_interval: config.ping_interval,
            span,
            last_active: AtomicI64::new(0),
            closed: AtomicBool::new(false),
            close_signal: CancellationToken::new(),
            requests_sent: AtomicU64::new(0),
            responses_received: AtomicU64::new(0),
            push_data_received: AtomicU64::new(0),
        };
        session.refresh_last_active();
        Ok(session)
    }

    pub fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Time of the last successful read or write
    pub fn last_active(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_active.load(Ordering::Relaxed))
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            responses_received: self.responses_received.load(Ordering::Relaxed),
            push_data_received: self.push_data_received.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn closed_signal(&self) -> &CancellationToken {
        &self.close_signal
    }

    /// Run the read loop and keep-alive together
    ///
    /// The first error from either stops both. Returns `Ok(())` once the
    /// session is closed locally and `Err(Cancelled)` when `shutdown` fires.
    pub async fn run(&self, shutdown: &CancellationToken) -> Result<()> {
        async {
            tokio::try_join!(
                keepalive::run(self, self.ping_interval, shutdown),
                self.consume(shutdown),
            )?;
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Validate and write one request frame
    pub async fn send<T: Validate + Serialize>(&self, request: &Request<T>) -> Result<()> {
        request.validate()?;
        if self.is_closed() {
            return Err(OkxError::ConnectionClosed);
        }
        let text = codec::encode(request)?;
        self.write_text(text).await?;
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        info!(
            parent: &self.span,
            op = %request.op,
            id = %request.id,
            args = request.args.len(),
            "ws request sent"
        );
        Ok(())
    }

    /// Close the socket once; later calls are no-ops
    pub async fn close(&self) -> Result<()> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }
        self.close_signal.cancel();

        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: Utf8Bytes::from_static(""),
        };
        let mut writer = self.writer.lock().await;
        match writer.send(WsMessage::Close(Some(frame))).await {
            Ok(()) => {}
            // Peer already went away; nothing left to hand-shake.
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {}
            Err(err) => return Err(err.into()),
        }
        match writer.close().await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {}
            Err(err) => return Err(err.into()),
        }
        info!(parent: &self.span, "websocket closed");
        Ok(())
    }

    pub(crate) async fn write_text(&self, text: impl Into<String>) -> Result<()> {
        let text: String = text.into();
        self.writer
            .lock()
            .await
            .send(WsMessage::Text(text.into()))
            .await?;
        self.refresh_last_active();
        Ok(())
    }

    async fn consume(&self, shutdown: &CancellationToken) -> Result<()> {
        let mut reader = self.reader.lock().await;
        loop {
            let frame = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Err(OkxError::Cancelled),
                _ = self.close_signal.cancelled() => return Ok(()),
                frame = reader.next() => frame,
            };

            let message = match frame {
                Some(Ok(message)) => message,
                Some(Err(_)) | None if self.is_closed() => return Ok(()),
                Some(Err(err)) => {
                    warn!(error = %err, "read websocket message failed");
                    return Err(err.into());
                }
                None => {
                    warn!("websocket stream ended");
                    return Err(OkxError::ConnectionClosed);
                }
            };
            self.refresh_last_active();

            match message {
                WsMessage::Text(text) => self.handle_text(text.as_str()).await,
                WsMessage::Close(frame) => info!(?frame, "close frame received"),
                other => debug!(kind = frame_kind(&other), "ignoring non-text frame"),
            }
        }
    }

    async fn handle_text(&self, text: &str) {
        let envelope = match codec::decode(text) {
            Ok(Inbound::Pong) => {
                debug!("pong received");
                return;
            }
            Ok(Inbound::Envelope(envelope)) => envelope,
            Err(err) => {
                warn!(
                    error = %err,
                    bytes = text.len(),
                    message = %truncate_for_log(text),
                    "decode websocket message failed"
                );
                return;
            }
        };

        match dispatch(self.handler.as_ref(), self.channel_type, envelope, text).await {
            MessageKind::PushData => {
                self.push_data_received.fetch_add(1, Ordering::Relaxed);
            }
            MessageKind::Response => {
                self.responses_received.fetch_add(1, Ordering::Relaxed);
            }
            MessageKind::Unknown => {}
        }
    }

    fn refresh_last_active(&self) {
        self.last_active
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("channel_type", &self.channel_type)
            .field("url", &self.url.as_str())
            .field("closed", &self.is_closed())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Write through a session handle that may be absent
pub async fn write_request<T: Validate + Serialize>(
    session: Option<&Session>,
    request: &Request<T>,
) -> Result<()> {
    let session = session.ok_or_else(|| {
        OkxError::InvalidArgument("websocket connection is missing".to_string())
    })?;
    session.send(request).await
}

/// Append the channel type path segment to the base URL
pub(crate) fn join_path(base_url: &Url, channel_type: ChannelType) -> Result<Url> {
    if !matches!(base_url.scheme(), "ws" | "wss") {
        return Err(OkxError::Config(format!(
            "unsupported websocket scheme {:?}",
            base_url.scheme()
        )));
    }
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| OkxError::Config(format!("{base_url} can't be a base url")))?
        .pop_if_empty()
        .push(channel_type.as_path());
    Ok(url)
}

async fn dial(url: &Url, timeout: Duration) -> Result<WsStream> {
    match time::timeout(timeout, connect_async(url.as_str())).await {
        Ok(Ok((stream, _response))) => Ok(stream),
        Ok(Err(source)) => Err(OkxError::Dial {
            url: url.to_string(),
            source,
        }),
        Err(_elapsed) => Err(OkxError::Timeout { duration: timeout }),
    }
}

fn frame_kind(message: &WsMessage) -> &'static str {
    match message {
        WsMessage::Text(_) => "text",
        WsMessage::Binary(_) => "binary",
        WsMessage::Ping(_) => "ping",
        WsMessage::Pong(_) => "pong",
        WsMessage::Close(_) => "close",
        WsMessage::Frame(_) => "frame",
    }
}
