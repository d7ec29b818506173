use crate::signaling::RoomNotifier;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use peerdrop_core::{ClientSignal, PeerId, ServerSignal};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
}

/// Connection table plus the store-and-forward relay. Negotiation payloads
/// are never inspected: an offer/answer/candidate goes to exactly the
/// addressed member, re-tagged with the true sender id.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
    }

    /// Serialize and deliver one signal. A disconnected target is a no-op,
    /// not an error: negotiation messages are ephemeral by design.
    pub fn send_signal(&self, peer_id: &PeerId, msg: &ServerSignal) {
        let Some(peer) = self.inner.peers.get(peer_id) else {
            debug!(peer = %peer_id, "Dropping signal for disconnected member");
            return;
        };
        match serde_json::to_string(msg) {
            Ok(json) => {
                if peer.send(Message::Text(json.into())).is_err() {
                    debug!(peer = %peer_id, "Peer send queue closed");
                }
            }
            Err(e) => error!("Failed to serialize signal: {e}"),
        }
    }

    /// Forward a client's negotiation message to its target, stamping the
    /// sender id server-side.
    pub fn relay(&self, sender: &PeerId, signal: ClientSignal) {
        let (target, msg) = match signal {
            ClientSignal::Offer { offer, target } => (
                target,
                ServerSignal::Offer {
                    offer,
                    sender: sender.clone(),
                },
            ),
            ClientSignal::Answer { answer, target } => (
                target,
                ServerSignal::Answer {
                    answer,
                    sender: sender.clone(),
                },
            ),
            ClientSignal::IceCandidate { candidate, target } => (
                target,
                ServerSignal::IceCandidate {
                    candidate,
                    sender: sender.clone(),
                },
            ),
            ClientSignal::JoinRoom { .. } => return,
        };
        self.send_signal(&target, &msg);
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomNotifier for SignalingService {
    async fn all_users(&self, to: PeerId, peers: Vec<PeerId>) {
        self.send_signal(&to, &ServerSignal::AllUsers { peers });
    }

    async fn user_joined(&self, to: PeerId, joined: PeerId) {
        self.send_signal(&to, &ServerSignal::UserJoined { peer_id: joined });
    }

    async fn user_disconnected(&self, to: PeerId, left: PeerId) {
        self.send_signal(&to, &ServerSignal::UserDisconnected { peer_id: left });
    }
}
