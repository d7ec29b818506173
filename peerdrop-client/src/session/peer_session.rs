use crate::session::SessionEvent;
use crate::transport::PeerConnection;
use peerdrop_core::PeerId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Negotiating,
    Connected,
    Closed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Failed)
    }
}

/// Lifecycle of one (local client, remote member) pair: the peer
/// connection, its optional data channel, and the negotiation timeout.
/// Owned exclusively by the orchestrator.
pub struct PeerSession {
    pub remote: PeerId,
    pub connection: PeerConnection,
    pub data_channel: Option<Arc<RTCDataChannel>>,
    pub state: SessionState,
    timeout: Option<JoinHandle<()>>,
}

impl PeerSession {
    pub fn new(remote: PeerId, connection: PeerConnection) -> Self {
        Self {
            remote,
            connection,
            data_channel: None,
            state: SessionState::Negotiating,
            timeout: None,
        }
    }

    /// Arm the negotiation timeout; fires a `Timeout` event unless
    /// cancelled first.
    pub fn arm_timeout(&mut self, window: Duration, event_tx: mpsc::Sender<SessionEvent>) {
        let remote = self.remote.clone();
        self.timeout = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = event_tx.send(SessionEvent::Timeout(remote)).await;
        }));
    }

    /// Cancel the pending timeout, if any. Calling this more than once is
    /// a no-op.
    pub fn cancel_timeout(&mut self) {
        if let Some(handle) = self.timeout.take() {
            handle.abort();
        }
    }

    /// Channel handle if it is open for sending right now.
    pub fn open_channel(&self) -> Option<Arc<RTCDataChannel>> {
        self.data_channel
            .as_ref()
            .filter(|dc| dc.ready_state() == RTCDataChannelState::Open)
            .cloned()
    }

    /// Terminal transition: cancel the timeout and release the underlying
    /// connection exactly once.
    pub async fn close(&mut self, terminal: SessionState) {
        debug_assert!(terminal.is_terminal());
        self.cancel_timeout();
        if self.state.is_terminal() {
            return;
        }
        self.state = terminal;
        let _ = self.connection.close().await;
    }
}
