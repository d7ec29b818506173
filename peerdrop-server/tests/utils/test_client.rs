use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use peerdrop_core::{ClientSignal, PeerId, RoomId, ServerSignal};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

const SIGNAL_TIMEOUT: Duration = Duration::from_secs(5);

/// A signaling client talking to a live server over a real WebSocket.
pub struct TestClient {
    /// The member id the service assigned to this connection.
    pub peer_id: PeerId,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect and consume the welcome message.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (stream, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .context("ws connect failed")?;

        let mut client = Self {
            peer_id: PeerId::new(),
            stream,
        };
        match client.next_signal().await? {
            ServerSignal::Welcome { peer_id } => client.peer_id = peer_id,
            other => bail!("expected welcome, got {other:?}"),
        }
        Ok(client)
    }

    pub async fn join(&mut self, room: &str) -> Result<()> {
        self.send(&ClientSignal::JoinRoom {
            room: RoomId::new(room),
        })
        .await
    }

    pub async fn send(&mut self, signal: &ClientSignal) -> Result<()> {
        let json = serde_json::to_string(signal)?;
        self.send_raw_text(&json).await
    }

    pub async fn send_raw_text(&mut self, text: &str) -> Result<()> {
        self.stream
            .send(Message::Text(text.to_owned().into()))
            .await
            .context("ws send failed")?;
        Ok(())
    }

    /// Next decoded signal, skipping transport frames, bounded by a timeout.
    pub async fn next_signal(&mut self) -> Result<ServerSignal> {
        loop {
            let msg = tokio::time::timeout(SIGNAL_TIMEOUT, self.stream.next())
                .await
                .context("timed out waiting for signal")?;
            match msg {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).context("undecodable signal");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(other)) => bail!("unexpected frame: {other:?}"),
                Some(Err(e)) => return Err(e).context("ws receive failed"),
                None => bail!("ws stream ended"),
            }
        }
    }

    /// Assert that no signal arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        match tokio::time::timeout(window, self.stream.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => bail!("unexpected signal: {text}"),
            Ok(_) => Ok(()),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await.ok();
        Ok(())
    }
}
