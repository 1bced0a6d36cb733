/*
[INPUT]:  WebSocket configuration, credentials and subscription channels
[OUTPUT]: Classified push data and operation responses via handlers
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding channels or changing connection logic
*/

pub mod client;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod handler;
mod keepalive;
pub mod session;

pub use client::OkxWebSocket;
pub use codec::{Envelope, Inbound, PING, PONG};
pub use config::{
    ClientConfig, DEFAULT_DIAL_TIMEOUT, DEFAULT_PING_INTERVAL, DEMO_BASE_URL, IDLE_TIMEOUT,
    KEEPALIVE_MARGIN, PRODUCTION_BASE_URL,
};
pub use dispatch::{MessageKind, classify};
pub use handler::{
    ChannelMessageHandler, LoggingMessageHandler, MessageHandler, NoopMessageHandler,
    WebSocketMessage,
};
pub use session::{Session, SessionStats, write_request};
