/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public OKX WebSocket adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod error;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::{Credentials, sign};

pub use error::{OkxError, Result};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    ChannelMessageHandler,
    ClientConfig,
    LoggingMessageHandler,
    MessageHandler,
    MessageKind,
    NoopMessageHandler,
    OkxWebSocket,
    Session,
    WebSocketMessage,
};
