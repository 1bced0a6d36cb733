/*
[INPUT]:  OKX production WebSocket endpoint
[OUTPUT]: Live BTC-USDT ticker updates logged to stdout
[POS]:    Examples - WebSocket stream handling
[UPDATE]: When WebSocket API changes
*/

use std::sync::Arc;

use okx_ws_adapter::ws::PRODUCTION_BASE_URL;
use okx_ws_adapter::*;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Example: subscribe to the public tickers channel
///
/// Runs for 30 seconds or until Ctrl-C, then closes every session.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let (handler, mut receiver) = ChannelMessageHandler::new(64);
    let client =
        OkxWebSocket::connect_with(PRODUCTION_BASE_URL, ClientConfig::default(), Arc::new(handler))
            .await?;

    client
        .public()
        .subscribe([TickersChannel::new("BTC-USDT")])
        .await?;

    let shutdown = CancellationToken::new();
    let run = tokio::spawn({
        let client = client.clone();
        let shutdown = shutdown.clone();
        async move { client.run(shutdown).await }
    });

    tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            match message {
                WebSocketMessage::PushData { data, .. } => {
                    match data.project::<TickersChannel, TickersData>() {
                        Ok(push) => {
                            for ticker in push.data {
                                println!(
                                    "{} last={} bid={} ask={}",
                                    ticker.inst_id, ticker.last, ticker.bid_px, ticker.ask_px
                                );
                            }
                        }
                        Err(err) => eprintln!("undecodable push: {err}"),
                    }
                }
                WebSocketMessage::Response { response, .. } => match response.error() {
                    Some(err) => eprintln!("request rejected: {err}"),
                    None => println!("{} ok", response.event),
                },
                WebSocketMessage::Unknown { message, .. } => println!("unknown: {message}"),
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sleep(Duration::from_secs(30)) => {}
    }

    shutdown.cancel();
    client.close().await?;
    if let Ok(Err(err)) = run.await {
        eprintln!("client stopped with error: {err}");
    }
    Ok(())
}
