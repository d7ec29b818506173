use crate::config::ClientConfig;
use crate::session::peer_session::{PeerSession, SessionState};
use crate::session::{ChannelData, Command, SessionEvent};
use crate::state::{ConnectionState, ConnectionStatus, SharedState};
use crate::transfer;
use crate::transport::PeerConnection;
use anyhow::Result;
use peerdrop_core::codec::{ChunkOutcome, ControlMessage, Reassembly, decode_control};
use peerdrop_core::{ClientSignal, PeerId, ServerSignal, Transfer, TransferId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const EVENT_QUEUE_DEPTH: usize = 256;

/// Single-task owner of every peer session and all reassembly state.
/// Transport callbacks, signaling messages and handle commands all funnel
/// into its event loop; no lock is ever held across a negotiation step.
pub struct Orchestrator {
    config: ClientConfig,
    shared: Arc<SharedState>,
    local_id: Option<PeerId>,
    sessions: HashMap<PeerId, PeerSession>,
    reassembly: Reassembly,
    signal_tx: mpsc::UnboundedSender<ClientSignal>,
    signal_rx: mpsc::UnboundedReceiver<ServerSignal>,
    event_tx: mpsc::Sender<SessionEvent>,
    event_rx: mpsc::Receiver<SessionEvent>,
    command_rx: mpsc::UnboundedReceiver<Command>,
}

impl Orchestrator {
    pub fn new(
        config: ClientConfig,
        shared: Arc<SharedState>,
        signal_tx: mpsc::UnboundedSender<ClientSignal>,
        signal_rx: mpsc::UnboundedReceiver<ServerSignal>,
        command_rx: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        Self {
            config,
            shared,
            local_id: None,
            sessions: HashMap::new(),
            reassembly: Reassembly::new(),
            signal_tx,
            signal_rx,
            event_tx,
            event_rx,
            command_rx,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                signal = self.signal_rx.recv() => {
                    match signal {
                        Some(signal) => self.handle_signal(signal).await,
                        None => {
                            warn!("Signaling connection lost");
                            self.shared.set_status(ConnectionStatus::failed(
                                "signaling connection lost",
                            ));
                            break;
                        }
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event).await;
                }
                command = self.command_rx.recv() => {
                    match command {
                        Some(Command::SendFile { path }) => {
                            if let Err(e) = self.send_file(&path).await {
                                warn!("Send request rejected: {e}");
                            }
                        }
                        Some(Command::Shutdown) | None => break,
                    }
                }
            }
        }
        self.teardown().await;
    }

    async fn handle_signal(&mut self, signal: ServerSignal) {
        match signal {
            ServerSignal::Welcome { peer_id } => {
                info!(%peer_id, "Assigned member id");
                self.local_id = Some(peer_id);
            }
            ServerSignal::AllUsers { peers } => {
                self.shared
                    .set_status(ConnectionStatus::new(ConnectionState::Connected));
                for peer in peers {
                    if let Err(e) = self.open_offerer_session(peer.clone()).await {
                        warn!(%peer, "Failed to open session: {e}");
                    }
                }
            }
            ServerSignal::UserJoined { peer_id } => {
                // The joiner offers to us; nothing to initiate here.
                debug!(%peer_id, "Member joined the room");
            }
            ServerSignal::Offer { offer, sender } => {
                if let Err(e) = self.open_answerer_session(sender.clone(), offer).await {
                    warn!(peer = %sender, "Failed to answer offer: {e}");
                    self.close_session(&sender, SessionState::Failed).await;
                }
            }
            ServerSignal::Answer { answer, sender } => {
                let Some(session) = self.sessions.get(&sender) else {
                    debug!(peer = %sender, "Answer for unknown session dropped");
                    return;
                };
                if let Err(e) = session.connection.apply_answer(answer).await {
                    warn!(peer = %sender, "Failed to apply answer: {e}");
                }
            }
            ServerSignal::IceCandidate { candidate, sender } => {
                let Some(session) = self.sessions.get(&sender) else {
                    debug!(peer = %sender, "Candidate for unknown session dropped");
                    return;
                };
                if let Err(e) = session.connection.add_ice_candidate(&candidate).await {
                    warn!(peer = %sender, "Failed to add candidate: {e}");
                }
            }
            ServerSignal::UserDisconnected { peer_id } => {
                info!(peer = %peer_id, "Member left the room");
                self.close_session(&peer_id, SessionState::Closed).await;
            }
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected(peer) => {
                if let Some(session) = self.sessions.get_mut(&peer) {
                    session.cancel_timeout();
                    session.state = SessionState::Connected;
                    self.shared.peer_connected(peer);
                }
            }
            SessionEvent::Disconnected(peer) => {
                self.close_session(&peer, SessionState::Failed).await;
            }
            SessionEvent::CandidateGenerated(peer, candidate) => {
                let _ = self.signal_tx.send(ClientSignal::IceCandidate {
                    candidate,
                    target: peer,
                });
            }
            SessionEvent::ChannelOpen(peer, dc) => {
                if let Some(session) = self.sessions.get_mut(&peer) {
                    session.data_channel = Some(dc);
                }
            }
            SessionEvent::ChannelMessage(peer, ChannelData::Text(text)) => {
                self.handle_control(peer, &text);
            }
            SessionEvent::ChannelMessage(peer, ChannelData::Binary(frame)) => {
                match self.reassembly.accept(&frame) {
                    Ok(ChunkOutcome::Progress { id, progress }) => {
                        self.shared.advance_incoming(&id, progress);
                    }
                    Ok(ChunkOutcome::Completed { id, payload }) => {
                        info!(transfer = %id, bytes = payload.len(), "Transfer complete");
                        self.shared.complete_incoming(&id, payload);
                    }
                    Ok(ChunkOutcome::Unknown { id }) => {
                        debug!(peer = %peer, transfer = %id, "Chunk for unknown transfer dropped");
                    }
                    Err(e) => {
                        warn!(peer = %peer, "Malformed chunk frame dropped: {e}");
                    }
                }
            }
            SessionEvent::Timeout(peer) => {
                let negotiating = self
                    .sessions
                    .get(&peer)
                    .is_some_and(|s| s.state == SessionState::Negotiating);
                if negotiating {
                    warn!(peer = %peer, "Negotiation timed out");
                    self.close_session(&peer, SessionState::Failed).await;
                }
            }
        }
    }

    fn handle_control(&mut self, peer: PeerId, text: &str) {
        let msg = match decode_control(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(peer = %peer, "Malformed control frame dropped: {e}");
                return;
            }
        };
        match msg {
            ControlMessage::FileStart {
                transfer_id,
                name,
                size,
                file_type,
            } => {
                if !self
                    .reassembly
                    .start(transfer_id.clone(), size, peer.clone())
                {
                    debug!(transfer = %transfer_id, "Duplicate announcement ignored");
                    return;
                }
                info!(peer = %peer, transfer = %transfer_id, %name, size, "Incoming transfer");
                self.shared.add_incoming(Transfer::incoming(
                    transfer_id,
                    name,
                    size,
                    file_type,
                    peer,
                ));
            }
        }
    }

    /// We are already in the room and a session towards `peer` does not
    /// exist yet: create the channel, produce the offer, start the clock.
    async fn open_offerer_session(&mut self, peer: PeerId) -> Result<()> {
        if self.sessions.contains_key(&peer) {
            return Ok(());
        }
        let connection =
            PeerConnection::new(peer.clone(), &self.config, self.event_tx.clone()).await?;
        let dc = connection.create_data_channel().await?;
        let offer = connection.create_offer().await?;

        let mut session = PeerSession::new(peer.clone(), connection);
        session.data_channel = Some(dc);
        session.arm_timeout(self.config.connection_timeout, self.event_tx.clone());
        self.sessions.insert(peer.clone(), session);

        let _ = self.signal_tx.send(ClientSignal::Offer {
            offer,
            target: peer,
        });
        Ok(())
    }

    async fn open_answerer_session(&mut self, peer: PeerId, offer: String) -> Result<()> {
        if self.sessions.contains_key(&peer) {
            debug!(peer = %peer, "Offer for existing session dropped");
            return Ok(());
        }
        let connection =
            PeerConnection::new(peer.clone(), &self.config, self.event_tx.clone()).await?;
        let answer = connection.accept_offer(offer).await?;

        let mut session = PeerSession::new(peer.clone(), connection);
        session.arm_timeout(self.config.connection_timeout, self.event_tx.clone());
        self.sessions.insert(peer.clone(), session);

        let _ = self.signal_tx.send(ClientSignal::Answer {
            answer,
            target: peer,
        });
        Ok(())
    }

    /// Tear down one peer: release the session, drop it from the connected
    /// set and fail every incoming transfer it still had in flight.
    async fn close_session(&mut self, peer: &PeerId, terminal: SessionState) {
        if let Some(mut session) = self.sessions.remove(peer) {
            session.close(terminal).await;
        }
        self.shared.peer_disconnected(peer);
        for id in self.reassembly.evict_peer(peer) {
            warn!(peer = %peer, transfer = %id, "Transfer interrupted");
            self.shared.fail_incoming(&id);
        }
    }

    /// Announce the file once per open channel and fan the chunks out. With
    /// no connected peer the ledger entry stays pending.
    async fn send_file(&mut self, path: &Path) -> Result<()> {
        let meta = tokio::fs::metadata(path).await?;
        let size = meta.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_owned());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        let id = TransferId::new();
        self.shared.add_outgoing(Transfer::outgoing(
            id.clone(),
            name.clone(),
            size,
            mime_type.clone(),
        ));

        let mut targets = 0;
        for session in self.sessions.values() {
            let Some(dc) = session.open_channel() else {
                continue;
            };
            targets += 1;
            tokio::spawn(transfer::send_to_peer(
                dc,
                session.remote.clone(),
                id.clone(),
                path.to_owned(),
                name.clone(),
                size,
                mime_type.clone(),
                Arc::clone(&self.shared),
            ));
        }
        info!(transfer = %id, %name, size, targets, "Send started");
        Ok(())
    }

    async fn teardown(&mut self) {
        let peers: Vec<PeerId> = self.sessions.keys().cloned().collect();
        for peer in peers {
            self.close_session(&peer, SessionState::Closed).await;
        }
        let current = self.shared.connected_peers();
        for peer in current {
            self.shared.peer_disconnected(&peer);
        }
    }
}
