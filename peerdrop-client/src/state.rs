use bytes::Bytes;
use dashmap::DashMap;
use peerdrop_core::{PeerId, Transfer, TransferId, TransferLedger};
use std::sync::RwLock;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Overall signaling connection state plus an optional human-readable
/// error. This is the only channel through which protocol-level failures
/// cross into the presentation layer.
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn new(state: ConnectionState) -> Self {
        Self { state, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            state: ConnectionState::Failed,
            error: Some(error.into()),
        }
    }
}

/// State observable by the presentation layer. Only the orchestrator and
/// its sender tasks mutate it; everyone else gets read-only snapshots.
pub struct SharedState {
    status_tx: watch::Sender<ConnectionStatus>,
    connected: DashMap<PeerId, ()>,
    incoming: RwLock<TransferLedger>,
    outgoing: RwLock<TransferLedger>,
}

impl SharedState {
    pub fn new() -> (std::sync::Arc<Self>, watch::Receiver<ConnectionStatus>) {
        let (status_tx, status_rx) =
            watch::channel(ConnectionStatus::new(ConnectionState::Disconnected));
        let state = std::sync::Arc::new(Self {
            status_tx,
            connected: DashMap::new(),
            incoming: RwLock::new(TransferLedger::new()),
            outgoing: RwLock::new(TransferLedger::new()),
        });
        (state, status_rx)
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        let _ = self.status_tx.send(status);
    }

    pub fn peer_connected(&self, peer: PeerId) {
        self.connected.insert(peer, ());
    }

    pub fn peer_disconnected(&self, peer: &PeerId) {
        self.connected.remove(peer);
    }

    pub fn connected_peers(&self) -> Vec<PeerId> {
        self.connected.iter().map(|e| e.key().clone()).collect()
    }

    // Incoming ledger, driven by codec events.

    pub fn add_incoming(&self, transfer: Transfer) -> bool {
        self.incoming.write().expect("ledger lock").append(transfer)
    }

    pub fn advance_incoming(&self, id: &TransferId, percent: u8) {
        self.incoming.write().expect("ledger lock").advance(id, percent);
    }

    pub fn complete_incoming(&self, id: &TransferId, payload: Bytes) {
        self.incoming
            .write()
            .expect("ledger lock")
            .complete(id, Some(payload));
    }

    pub fn fail_incoming(&self, id: &TransferId) {
        self.incoming.write().expect("ledger lock").fail(id);
    }

    pub fn incoming_snapshot(&self) -> Vec<Transfer> {
        self.incoming
            .read()
            .expect("ledger lock")
            .iter()
            .cloned()
            .collect()
    }

    pub fn incoming_payload(&self, id: &TransferId) -> Option<Bytes> {
        self.incoming.read().expect("ledger lock").payload(id)
    }

    // Outgoing ledger, driven by per-peer sender tasks.

    pub fn add_outgoing(&self, transfer: Transfer) -> bool {
        self.outgoing.write().expect("ledger lock").append(transfer)
    }

    pub fn advance_outgoing(&self, id: &TransferId, percent: u8) {
        self.outgoing.write().expect("ledger lock").advance(id, percent);
    }

    pub fn complete_outgoing(&self, id: &TransferId) {
        self.outgoing.write().expect("ledger lock").complete(id, None);
    }

    pub fn fail_outgoing(&self, id: &TransferId) {
        self.outgoing.write().expect("ledger lock").fail(id);
    }

    pub fn outgoing_snapshot(&self) -> Vec<Transfer> {
        self.outgoing
            .read()
            .expect("ledger lock")
            .iter()
            .cloned()
            .collect()
    }
}
