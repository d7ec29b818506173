use peerdrop_core::PeerId;

/// Commands routed to one room's actor by the registry. Each room consumes
/// its queue sequentially, which serializes all mutations of that room's
/// member set.
#[derive(Debug)]
pub enum RoomCommand {
    /// Add the member, tell it who is already here, announce it to the rest.
    Join { peer_id: PeerId },

    /// Remove the member (WebSocket closed or room switch) and notify the
    /// remaining members.
    Leave { peer_id: PeerId },
}
