use crate::config::ClientConfig;
use crate::session::{Command, Orchestrator};
use crate::signaling;
use crate::state::{ConnectionState, ConnectionStatus, SharedState};
use bytes::Bytes;
use peerdrop_core::{ClientSignal, PeerId, RoomId, Transfer, TransferId};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to reach signaling service: {0}")]
    Connect(String),

    #[error("client is shut down")]
    Closed,
}

/// Public handle over a running client. Cheap to query; all mutation goes
/// through the orchestrator task. Dropping the handle shuts the client
/// down.
pub struct PeerDropClient {
    shared: Arc<SharedState>,
    status_rx: watch::Receiver<ConnectionStatus>,
    signal_tx: mpsc::UnboundedSender<ClientSignal>,
    command_tx: mpsc::UnboundedSender<Command>,
    orchestrator: JoinHandle<()>,
}

impl PeerDropClient {
    /// Probe the service, open the signaling link with bounded retries and
    /// start the orchestrator.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let (shared, status_rx) = SharedState::new();
        shared.set_status(ConnectionStatus::new(ConnectionState::Connecting));

        let (signal_tx, signal_rx) = match signaling::establish(&config).await {
            Ok(link) => link,
            Err(e) => {
                shared.set_status(ConnectionStatus::failed(e.to_string()));
                return Err(ClientError::Connect(e.to_string()));
            }
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator::new(
            config,
            Arc::clone(&shared),
            signal_tx.clone(),
            signal_rx,
            command_rx,
        );
        let orchestrator = tokio::spawn(orchestrator.run());

        Ok(Self {
            shared,
            status_rx,
            signal_tx,
            command_tx,
            orchestrator,
        })
    }

    /// Enter a room; sessions towards existing members open automatically.
    /// Joining a second room leaves the first.
    pub fn join_room(&self, room: impl AsRef<str>) -> Result<(), ClientError> {
        self.signal_tx
            .send(ClientSignal::JoinRoom {
                room: RoomId::new(room),
            })
            .map_err(|_| ClientError::Closed)
    }

    /// Queue a file for fan-out to every currently connected peer.
    pub fn send_file(&self, path: impl Into<PathBuf>) -> Result<(), ClientError> {
        self.command_tx
            .send(Command::SendFile { path: path.into() })
            .map_err(|_| ClientError::Closed)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status_rx.borrow().clone()
    }

    /// Watch endpoint for status transitions, for callers that want to
    /// await `Connected` instead of polling.
    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    pub fn connected_peers(&self) -> Vec<PeerId> {
        self.shared.connected_peers()
    }

    pub fn incoming(&self) -> Vec<Transfer> {
        self.shared.incoming_snapshot()
    }

    pub fn outgoing(&self) -> Vec<Transfer> {
        self.shared.outgoing_snapshot()
    }

    /// Reassembled bytes of a completed incoming transfer.
    pub fn completed_payload(&self, id: &TransferId) -> Option<Bytes> {
        self.shared.incoming_payload(id)
    }

    /// Close every session and the signaling link, then wait for the
    /// orchestrator to finish.
    pub async fn shutdown(self) {
        let _ = self.command_tx.send(Command::Shutdown);
        let _ = self.orchestrator.await;
    }
}
