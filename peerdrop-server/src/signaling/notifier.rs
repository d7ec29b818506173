use async_trait::async_trait;
use peerdrop_core::PeerId;

/// Membership notifications a room actor emits towards connected clients.
/// The registry stays ignorant of how clients are reached; the WebSocket
/// layer implements this.
#[async_trait]
pub trait RoomNotifier: Send + Sync {
    /// Tell the joining member which other members are already in the room.
    async fn all_users(&self, to: PeerId, peers: Vec<PeerId>);

    /// Tell an existing member that a new member joined.
    async fn user_joined(&self, to: PeerId, joined: PeerId);

    /// Tell a remaining member that another member left.
    async fn user_disconnected(&self, to: PeerId, left: PeerId);
}
