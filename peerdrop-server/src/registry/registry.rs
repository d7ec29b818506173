use crate::registry::{Room, RoomCommand};
use crate::signaling::RoomNotifier;
use dashmap::DashMap;
use peerdrop_core::{PeerId, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Owns the active-room table. Rooms are created on first join and each
/// runs as its own actor task, so concurrent joins and leaves for one room
/// are applied one at a time while distinct rooms proceed in parallel.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    membership: Arc<DashMap<PeerId, RoomId>>,
    notifier: Arc<dyn RoomNotifier>,
}

impl RoomRegistry {
    pub fn new(notifier: Arc<dyn RoomNotifier>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            membership: Arc::new(DashMap::new()),
            notifier,
        }
    }

    /// Add `peer_id` to `room_id`, creating the room if needed. A member is
    /// in at most one room at a time: joining a second room leaves the
    /// first.
    pub async fn join(&self, room_id: RoomId, peer_id: PeerId) {
        let previous = self.membership.get(&peer_id).map(|r| r.clone());
        if let Some(previous) = previous
            && previous != room_id
        {
            self.send_to_room(
                &previous,
                RoomCommand::Leave {
                    peer_id: peer_id.clone(),
                },
                false,
            )
            .await;
        }

        self.membership.insert(peer_id.clone(), room_id.clone());
        self.send_to_room(&room_id, RoomCommand::Join { peer_id }, true)
            .await;
    }

    /// Remove `peer_id` from whichever room it belongs to. Safe to call for
    /// peers that never joined a room.
    pub async fn disconnect(&self, peer_id: &PeerId) {
        let Some((_, room_id)) = self.membership.remove(peer_id) else {
            return;
        };
        self.send_to_room(
            &room_id,
            RoomCommand::Leave {
                peer_id: peer_id.clone(),
            },
            false,
        )
        .await;
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Deliver a command to the room actor. An actor that emptied out may
    /// still occupy the table for an instant; a failed send means it is
    /// gone, so the stale entry is dropped and (for joins) the room is
    /// recreated.
    async fn send_to_room(&self, room_id: &RoomId, cmd: RoomCommand, create: bool) {
        let mut cmd = cmd;
        loop {
            let tx = if create {
                Some(self.room_sender(room_id))
            } else {
                self.rooms.get(room_id).map(|e| e.clone())
            };
            let Some(tx) = tx else {
                return;
            };

            match tx.send(cmd).await {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    debug!(room = %room_id, "Room actor gone, dropping stale entry");
                    self.rooms.remove_if(room_id, |_, s| s.same_channel(&tx));
                    if !create {
                        return;
                    }
                    cmd = returned;
                }
            }
        }
    }

    fn room_sender(&self, room_id: &RoomId) -> mpsc::Sender<RoomCommand> {
        Room::sender_in(&self.rooms, &self.notifier, room_id)
    }
}
