use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Messages a client sends to the signaling service. Offer/answer/candidate
/// payloads are opaque to the service; it forwards them verbatim to the
/// target member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientSignal {
    #[serde(rename = "join-room")]
    JoinRoom { room: RoomId },

    #[serde(rename = "offer")]
    Offer { offer: String, target: PeerId },

    #[serde(rename = "answer")]
    Answer { answer: String, target: PeerId },

    #[serde(rename = "ice-candidate")]
    IceCandidate { candidate: String, target: PeerId },
}

/// Messages the signaling service sends to a client. Relayed negotiation
/// messages carry the sender id stamped by the service, never trusted from
/// the sending client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerSignal {
    /// First message on every connection: the member id assigned to it.
    #[serde(rename = "welcome")]
    Welcome { peer_id: PeerId },

    /// Sent once to a joining member: the other members already in the room.
    #[serde(rename = "all-users")]
    AllUsers { peers: Vec<PeerId> },

    #[serde(rename = "user-joined")]
    UserJoined { peer_id: PeerId },

    #[serde(rename = "offer")]
    Offer { offer: String, sender: PeerId },

    #[serde(rename = "answer")]
    Answer { answer: String, sender: PeerId },

    #[serde(rename = "ice-candidate")]
    IceCandidate { candidate: String, sender: PeerId },

    #[serde(rename = "user-disconnected")]
    UserDisconnected { peer_id: PeerId },
}
