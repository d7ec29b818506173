use crate::config::ClientConfig;
use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use peerdrop_core::{ClientSignal, ServerSignal};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Pre-flight reachability check against `/health`. Separates "service
/// unreachable" from every later negotiation failure.
pub async fn check_health(config: &ClientConfig) -> bool {
    let client = match reqwest::Client::builder().timeout(HEALTH_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return false,
    };
    match client.get(config.health_url()).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(e) => {
            debug!("Health probe failed: {e}");
            false
        }
    }
}

/// Open the signaling WebSocket, with the configured bounded number of
/// attempts. Returns a writer handle and the stream of decoded server
/// signals; both ends close when the connection drops.
pub async fn connect(
    config: &ClientConfig,
) -> Result<(
    mpsc::UnboundedSender<ClientSignal>,
    mpsc::UnboundedReceiver<ServerSignal>,
)> {
    let url = config.ws_url();

    let mut attempt = 0u32;
    let stream = loop {
        attempt += 1;
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => break stream,
            Err(e) if attempt < config.connect_attempts => {
                warn!(attempt, "Signaling connect failed: {e}; retrying");
                tokio::time::sleep(config.connect_retry_delay).await;
            }
            Err(e) => {
                bail!("signaling service connect failed after {attempt} attempts: {e}")
            }
        }
    };
    info!(%url, "Connected to signaling service");

    let (mut ws_tx, mut ws_rx) = stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientSignal>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerSignal>();

    tokio::spawn(async move {
        while let Some(signal) = out_rx.recv().await {
            let json = match serde_json::to_string(&signal) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize signal: {e}");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    tokio::spawn(async move {
        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str(text.as_str()) {
                    Ok(signal) => {
                        if in_tx.send(signal).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Undecodable server signal: {e}"),
                },
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        // Dropping in_tx closes the orchestrator's signal stream, which it
        // treats as loss of the signaling service.
    });

    Ok((out_tx, in_rx))
}

/// Health probe plus connect, the order clients are expected to use.
pub async fn establish(
    config: &ClientConfig,
) -> Result<(
    mpsc::UnboundedSender<ClientSignal>,
    mpsc::UnboundedReceiver<ServerSignal>,
)> {
    if !check_health(config).await {
        bail!(
            "signaling service not reachable at {} (health probe failed)",
            config.server_url
        );
    }
    connect(config).await.context("signaling connect")
}
