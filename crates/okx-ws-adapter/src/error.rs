/*
[INPUT]:  Error sources (configuration, dial, framing, transport, server codes)
[OUTPUT]: Structured error type with fatal/absorbable classification
[POS]:    Error handling layer - unified error type for entire crate
[UPDATE]: When adding new error sources or changing propagation policy
*/

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Main error type for the OKX WebSocket adapter
#[derive(Error, Debug)]
pub enum OkxError {
    /// Credential or client configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket handshake failed
    #[error("Dial websocket server (addr: {url:?}) failed: {source}")]
    Dial {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// Dial did not complete in time
    #[error("Connection timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// A single inbound frame could not be decoded
    #[error("Malformed message: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    /// An outbound request could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Transport-level failure on an open socket
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The peer ended the stream without a local close request
    #[error("WebSocket connection closed by peer")]
    ConnectionClosed,

    /// Outbound request rejected before anything was written
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Server answered an operation with a non-zero code
    #[error("Operation error (event {event:?}, code {code}): {msg}")]
    Operation {
        event: String,
        code: String,
        msg: String,
        conn_id: String,
    },

    /// The controlling shutdown token fired
    #[error("Operation cancelled")]
    Cancelled,

    /// Several independent failures, e.g. from closing every session
    #[error("{}", join_errors(.0))]
    Multiple(Vec<OkxError>),
}

impl OkxError {
    /// Whether the error ends a session's lifetime.
    ///
    /// Decode failures and server operation errors leave the stream usable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OkxError::Dial { .. }
                | OkxError::Timeout { .. }
                | OkxError::WebSocket(_)
                | OkxError::ConnectionClosed
        )
    }

    /// Check if error came from the server rejecting an operation
    pub fn is_operation_error(&self) -> bool {
        matches!(self, OkxError::Operation { .. })
    }

    /// Server error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            OkxError::Operation { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// Collapse a list of errors: none is `Ok`, one is itself, more is `Multiple`.
    pub(crate) fn join(mut errors: Vec<OkxError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(OkxError::Multiple(errors)),
        }
    }
}

fn join_errors(errors: &[OkxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for OKX WebSocket operations
pub type Result<T> = std::result::Result<T, OkxError>;
