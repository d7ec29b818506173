use std::time::Duration;

/// Client-side knobs. Defaults mirror the signaling service's expectations:
/// public STUN for candidate discovery, a 10 s negotiation window, and a
/// small bounded number of signaling connection attempts.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base HTTP URL of the signaling service, e.g. `http://192.168.1.10:3001`.
    pub server_url: String,
    /// STUN/TURN urls handed to every peer connection.
    pub ice_servers: Vec<String>,
    /// A session that has not reached `connected` within this window is
    /// force-closed and discarded.
    pub connection_timeout: Duration,
    /// Bounded signaling connection attempts before giving up.
    pub connect_attempts: u32,
    pub connect_retry_delay: Duration,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    /// `ws://.../ws` endpoint derived from the base URL.
    pub fn ws_url(&self) -> String {
        let base = self
            .server_url
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{}/ws", base.trim_end_matches('/'))
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.server_url.trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3001".to_owned(),
            ice_servers: vec![
                "stun:stun.l.google.com:19302".to_owned(),
                "stun:stun1.l.google.com:19302".to_owned(),
            ],
            connection_timeout: Duration::from_secs(10),
            connect_attempts: 3,
            connect_retry_delay: Duration::from_secs(3),
        }
    }
}
