/*
[INPUT]:  Caller overrides for timeouts, keep-alive period and log span
[OUTPUT]: ClientConfig consumed by sessions at connect time
[POS]:    WebSocket layer - connection configuration
[UPDATE]: When adding connection options or changing defaults
*/

use std::time::Duration;

use tracing::Span;

use crate::error::{OkxError, Result};

/// Production endpoint base; the channel type path is appended
pub const PRODUCTION_BASE_URL: &str = "wss://ws.okx.com:8443/ws/v5";
/// Demo trading endpoint base
pub const DEMO_BASE_URL: &str = "wss://wspap.okx.com:8443/ws/v5";

/// Server drops connections idle for this long
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);
/// Head start the keep-alive ping takes over the idle timeout
pub const KEEPALIVE_MARGIN: Duration = Duration::from_secs(5);
pub const DEFAULT_PING_INTERVAL: Duration = IDLE_TIMEOUT.saturating_sub(KEEPALIVE_MARGIN);
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(3);

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound for each socket handshake
    pub dial_timeout: Duration,
    /// Keep-alive period
    pub ping_interval: Duration,
    /// Parent span for every session's log output
    pub span: Span,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            ping_interval: DEFAULT_PING_INTERVAL,
            span: tracing::info_span!("okx_ws"),
        }
    }
}

impl ClientConfig {
    pub fn with_dial_timeout(mut self, dial_timeout: Duration) -> Self {
        self.dial_timeout = dial_timeout;
        self
    }

    pub fn with_ping_interval(mut self, ping_interval: Duration) -> Self {
        self.ping_interval = ping_interval;
        self
    }

    /// Route session logs under the given span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Reject durations the dialer or keep-alive timer can't run with
    pub fn validate(&self) -> Result<()> {
        if self.dial_timeout.is_zero() {
            return Err(OkxError::Config("dial timeout must be non-zero".to_string()));
        }
        if self.ping_interval.is_zero() {
            return Err(OkxError::Config("ping interval must be non-zero".to_string()));
        }
        Ok(())
    }
}
