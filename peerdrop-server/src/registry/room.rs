use crate::registry::RoomCommand;
use crate::signaling::RoomNotifier;
use dashmap::DashMap;
use peerdrop_core::{PeerId, RoomId};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// One active room: a member set plus the event loop that owns it. The
/// actor exits once its member set and its command queue are both empty,
/// deregistering itself from the shared room table on the way out.
pub struct Room {
    id: RoomId,
    members: HashSet<PeerId>,
    command_rx: mpsc::Receiver<RoomCommand>,
    notifier: Arc<dyn RoomNotifier>,
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    own_tx: mpsc::Sender<RoomCommand>,
}

impl Room {
    pub fn new(
        id: RoomId,
        command_rx: mpsc::Receiver<RoomCommand>,
        notifier: Arc<dyn RoomNotifier>,
        rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
        own_tx: mpsc::Sender<RoomCommand>,
    ) -> Self {
        Self {
            id,
            members: HashSet::new(),
            command_rx,
            notifier,
            rooms,
            own_tx,
        }
    }

    /// Get-or-create the actor for `room_id` in the shared table.
    pub(crate) fn sender_in(
        rooms: &Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
        notifier: &Arc<dyn RoomNotifier>,
        room_id: &RoomId,
    ) -> mpsc::Sender<RoomCommand> {
        rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                let (tx, rx) = mpsc::channel(64);
                let room = Room::new(
                    room_id.clone(),
                    rx,
                    notifier.clone(),
                    rooms.clone(),
                    tx.clone(),
                );
                tokio::spawn(room.run());
                tx
            })
            .clone()
    }

    pub async fn run(mut self) {
        info!(room = %self.id, "Room created");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle(cmd).await;

            if !self.members.is_empty() {
                continue;
            }
            // A command already queued behind the emptying leave may
            // repopulate the room; it must not die with a non-empty queue.
            while let Ok(cmd) = self.command_rx.try_recv() {
                self.handle(cmd).await;
            }
            if !self.members.is_empty() {
                continue;
            }
            // Freeze the queue. From here on sends fail and take the
            // registry's recreate path; anything that landed first is
            // still drained by this loop.
            self.command_rx.close();
        }
        // recv() yields None only once the queue is closed and fully
        // drained, so the member set is now final.

        self.rooms
            .remove_if(&self.id, |_, tx| tx.same_channel(&self.own_tx));

        if self.members.is_empty() {
            info!(room = %self.id, "Room empty, deleted");
            return;
        }

        // A join slipped in between the drain and the freeze. Hand the
        // members over to a fresh actor under the same id; re-notification
        // of an already-known member is harmless.
        info!(room = %self.id, members = self.members.len(), "Rehoming members into a fresh actor");
        let members: Vec<PeerId> = self.members.drain().collect();
        for peer_id in members {
            let mut cmd = RoomCommand::Join { peer_id };
            loop {
                let tx = Room::sender_in(&self.rooms, &self.notifier, &self.id);
                match tx.send(cmd).await {
                    Ok(()) => break,
                    Err(mpsc::error::SendError(returned)) => {
                        self.rooms.remove_if(&self.id, |_, s| s.same_channel(&tx));
                        cmd = returned;
                    }
                }
            }
        }
    }

    async fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { peer_id } => self.handle_join(peer_id).await,
            RoomCommand::Leave { peer_id } => self.handle_leave(peer_id).await,
        }
    }

    async fn handle_join(&mut self, peer_id: PeerId) {
        let others: Vec<PeerId> = self
            .members
            .iter()
            .filter(|m| **m != peer_id)
            .cloned()
            .collect();

        if self.members.insert(peer_id.clone()) {
            info!(room = %self.id, peer = %peer_id, size = self.members.len(), "Member joined");
            for other in &others {
                self.notifier
                    .user_joined(other.clone(), peer_id.clone())
                    .await;
            }
        } else {
            debug!(room = %self.id, peer = %peer_id, "Duplicate join ignored");
        }

        // The member list goes to the joining member only, without itself.
        self.notifier.all_users(peer_id, others).await;
    }

    async fn handle_leave(&mut self, peer_id: PeerId) {
        if !self.members.remove(&peer_id) {
            return;
        }
        info!(room = %self.id, peer = %peer_id, size = self.members.len(), "Member left");

        for other in &self.members {
            self.notifier
                .user_disconnected(other.clone(), peer_id.clone())
                .await;
        }
    }
}
