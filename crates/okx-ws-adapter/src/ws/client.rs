/*
[INPUT]:  Base WebSocket URL, client config and message handler
[OUTPUT]: Public/private/business sessions run and closed as one unit
[POS]:    WebSocket layer - multi-session orchestration
[UPDATE]: When adding operations or changing run/close semantics
*/

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::future::join_all;
use futures_util::stream::FuturesUnordered;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::config::ClientConfig;
use super::handler::{MessageHandler, NoopMessageHandler};
use super::session::{Session, write_request};
use crate::auth::Credentials;
use crate::error::{OkxError, Result};
use crate::types::{Channel, ChannelType, LoginArg, Operation, Request};

struct Inner {
    url: Url,
    sessions: BTreeMap<ChannelType, Session>,
    closed: AtomicBool,
}

/// OKX v5 WebSocket client
///
/// Holds one session per channel type, all dialed at construction. Clones
/// and selector views share the sessions; each view has its own selected
/// channel type, which decides where `login`/`subscribe`/`unsubscribe` go.
#[derive(Clone)]
pub struct OkxWebSocket {
    inner: Arc<Inner>,
    channel_type: ChannelType,
}

impl OkxWebSocket {
    /// Connect with default configuration and a no-op handler
    pub async fn connect(base_url: &str) -> Result<Self> {
        Self::connect_with(
            base_url,
            ClientConfig::default(),
            Arc::new(NoopMessageHandler),
        )
        .await
    }

    /// Dial the public, private and business paths concurrently
    ///
    /// A config with a zero timeout or ping interval is rejected before
    /// dialing. Any dial failure is returned as-is after closing the
    /// sessions that did connect.
    pub async fn connect_with(
        base_url: &str,
        config: ClientConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self> {
        let url = Url::parse(base_url)?;
        config.validate()?;

        let dials = ChannelType::ALL.map(|channel_type| {
            let handler = Arc::clone(&handler);
            let url = &url;
            let config = &config;
            async move {
                Session::connect(url, channel_type, config, handler)
                    .await
                    .map(|session| (channel_type, session))
            }
        });

        let mut sessions = BTreeMap::new();
        let mut first_error = None;
        for result in join_all(dials).await {
            match result {
                Ok((channel_type, session)) => {
                    sessions.insert(channel_type, session);
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = first_error {
            for session in sessions.values() {
                if let Err(close_err) = session.close().await {
                    debug!(
                        channel_type = %session.channel_type(),
                        error = %close_err,
                        "close after failed connect"
                    );
                }
            }
            return Err(err);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                url,
                sessions,
                closed: AtomicBool::new(false),
            }),
            channel_type: ChannelType::Public,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.url
    }

    /// Channel type this view sends operations to
    pub fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    /// View bound to the public path
    pub fn public(&self) -> Self {
        self.select(ChannelType::Public)
    }

    /// View bound to the private path
    pub fn private(&self) -> Self {
        self.select(ChannelType::Private)
    }

    /// View bound to the business path
    pub fn business(&self) -> Self {
        self.select(ChannelType::Business)
    }

    /// View bound to `channel_type`; the receiver keeps its own selection
    pub fn select(&self, channel_type: ChannelType) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            channel_type,
        }
    }

    /// Session of the selected channel type
    pub fn session(&self) -> Option<&Session> {
        self.session_for(self.channel_type)
    }

    pub fn session_for(&self, channel_type: ChannelType) -> Option<&Session> {
        self.inner.sessions.get(&channel_type)
    }

    /// Last read/write time of the selected session
    pub fn last_active(&self) -> Option<DateTime<Utc>> {
        self.session().and_then(Session::last_active)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Log in on the selected path
    ///
    /// https://www.okx.com/docs-v5/en/#overview-websocket-login
    pub async fn login(&self, credentials: &[Credentials]) -> Result<()> {
        let timestamp = Utc::now().timestamp();
        let mut args = Vec::with_capacity(credentials.len());
        for credential in credentials {
            credential.validate()?;
            args.push(LoginArg::new(credential, timestamp));
        }
        write_request(self.session(), &Request::new(Operation::Login, args)).await
    }

    /// Subscribe channels on the selected path
    pub async fn subscribe<C: Channel>(&self, channels: impl IntoIterator<Item = C>) -> Result<()> {
        let request = Request::new(Operation::Subscribe, channels.into_iter().collect());
        write_request(self.session(), &request).await
    }

    /// Unsubscribe channels on the selected path
    ///
    /// https://www.okx.com/docs-v5/en/#overview-websocket-unsubscribe
    pub async fn unsubscribe<C: Channel>(
        &self,
        channels: impl IntoIterator<Item = C>,
    ) -> Result<()> {
        let request = Request::new(Operation::Unsubscribe, channels.into_iter().collect());
        write_request(self.session(), &request).await
    }

    /// Run every session until all have stopped
    ///
    /// The first session error cancels the others and is returned once they
    /// have wound down. Cancelling `shutdown` yields `Ok(())`.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let group = shutdown.child_token();
        let mut runs: FuturesUnordered<_> = self
            .inner
            .sessions
            .values()
            .map(|session| {
                let group = &group;
                async move { (session.channel_type(), session.run(group).await) }
            })
            .collect();

        let mut first_error = None;
        while let Some((channel_type, result)) = runs.next().await {
            match result {
                Ok(()) | Err(OkxError::Cancelled) => {
                    debug!(%channel_type, "session stopped");
                }
                Err(err) if first_error.is_none() => {
                    warn!(%channel_type, error = %err, "session failed");
                    group.cancel();
                    first_error = Some(err);
                }
                Err(err) => {
                    debug!(%channel_type, error = %err, "session failed after group cancel");
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Close every session once, collecting all close errors
    pub async fn close(&self) -> Result<()> {
        if self
            .inner
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        let results = join_all(self.inner.sessions.values().map(|session| session.close())).await;
        OkxError::join(results.into_iter().filter_map(Result::err).collect())
    }
}

impl fmt::Debug for OkxWebSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OkxWebSocket")
            .field("url", &self.inner.url.as_str())
            .field("channel_type", &self.channel_type)
            .field("sessions", &self.inner.sessions.values().collect::<Vec<_>>())
            .field("closed", &self.is_closed())
            .finish()
    }
}
