/*
[INPUT]:  Classified inbound messages from a session read loop
[OUTPUT]: Application callbacks, log lines or channel events
[POS]:    WebSocket layer - pluggable message handling
[UPDATE]: When adding handler callbacks or convenience handlers
*/

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::codec::truncate_for_log;
use crate::types::{ChannelType, RawChannel, RawPushData, Response};

/// Callbacks invoked by a session for every decoded frame
///
/// Callbacks are awaited on the read loop: frames of one session are handled
/// strictly in order and a slow callback delays the frames behind it.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Subscribed data (frames without `event`)
    async fn handle_push_data(&self, channel_type: ChannelType, data: RawPushData);

    /// Operation results (subscribe, unsubscribe, login, error)
    async fn handle_response(&self, channel_type: ChannelType, response: Response<RawChannel>);

    /// Frames with an event this crate does not classify
    async fn handle_unknown_message(&self, channel_type: ChannelType, message: &str);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMessageHandler;

#[async_trait]
impl MessageHandler for NoopMessageHandler {
    async fn handle_push_data(&self, _channel_type: ChannelType, _data: RawPushData) {}

    async fn handle_response(&self, _channel_type: ChannelType, _response: Response<RawChannel>) {}

    async fn handle_unknown_message(&self, _channel_type: ChannelType, _message: &str) {}
}

/// Logs every message at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMessageHandler;

#[async_trait]
impl MessageHandler for LoggingMessageHandler {
    async fn handle_push_data(&self, channel_type: ChannelType, data: RawPushData) {
        info!(
            %channel_type,
            items = data.data.len(),
            message = %truncate_for_log(data.raw_message()),
            "receive push data"
        );
    }

    async fn handle_response(&self, channel_type: ChannelType, response: Response<RawChannel>) {
        info!(
            %channel_type,
            event = %response.event,
            code = %response.code,
            message = %truncate_for_log(response.raw_message()),
            "receive response"
        );
    }

    async fn handle_unknown_message(&self, channel_type: ChannelType, message: &str) {
        info!(
            %channel_type,
            message = %truncate_for_log(message),
            "receive unknown message"
        );
    }
}

/// WebSocket message as forwarded by [`ChannelMessageHandler`]
#[derive(Debug, Clone)]
pub enum WebSocketMessage {
    PushData {
        channel_type: ChannelType,
        data: RawPushData,
    },
    Response {
        channel_type: ChannelType,
        response: Response<RawChannel>,
    },
    Unknown {
        channel_type: ChannelType,
        message: String,
    },
}

impl WebSocketMessage {
    pub fn channel_type(&self) -> ChannelType {
        match self {
            WebSocketMessage::PushData { channel_type, .. }
            | WebSocketMessage::Response { channel_type, .. }
            | WebSocketMessage::Unknown { channel_type, .. } => *channel_type,
        }
    }
}

/// Forwards messages into a bounded channel
///
/// A full channel stalls the session's read loop until the receiver catches
/// up. Messages are dropped once the receiver is gone. A `capacity` of zero
/// is raised to one.
#[derive(Debug, Clone)]
pub struct ChannelMessageHandler {
    message_tx: mpsc::Sender<WebSocketMessage>,
}

impl ChannelMessageHandler {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<WebSocketMessage>) {
        let (message_tx, message_rx) = mpsc::channel(capacity.max(1));
        (Self { message_tx }, message_rx)
    }

    async fn forward(&self, message: WebSocketMessage) {
        if self.message_tx.send(message).await.is_err() {
            debug!("message receiver dropped; discarding message");
        }
    }
}

#[async_trait]
impl MessageHandler for ChannelMessageHandler {
    async fn handle_push_data(&self, channel_type: ChannelType, data: RawPushData) {
        self.forward(WebSocketMessage::PushData { channel_type, data })
            .await;
    }

    async fn handle_response(&self, channel_type: ChannelType, response: Response<RawChannel>) {
        self.forward(WebSocketMessage::Response {
            channel_type,
            response,
        })
        .await;
    }

    async fn handle_unknown_message(&self, channel_type: ChannelType, message: &str) {
        self.forward(WebSocketMessage::Unknown {
            channel_type,
            message: message.to_string(),
        })
        .await;
    }
}
