/*
[INPUT]:  Open session, ping period and shutdown token
[OUTPUT]: Periodic `ping` text frames until shutdown or close
[POS]:    WebSocket layer - idle-timeout prevention
[UPDATE]: When changing keep-alive period or failure handling
*/

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::codec::PING;
use super::session::Session;
use crate::error::{OkxError, Result};

/// Send `ping` every `period` until the session closes.
///
/// A failed ping is logged and the loop keeps going; a dead socket is
/// reported by the read loop instead.
pub(crate) async fn run(
    session: &Session,
    period: Duration,
    shutdown: &CancellationToken,
) -> Result<()> {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(OkxError::Cancelled),
            _ = session.closed_signal().cancelled() => return Ok(()),
            _ = ticker.tick() => {}
        }

        if session.is_closed() {
            return Ok(());
        }

        match session.write_text(PING).await {
            Ok(()) => debug!("ping successful"),
            Err(err) => warn!(error = %err, "ping failed"),
        }
    }
}
