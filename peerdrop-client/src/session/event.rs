use bytes::Bytes;
use peerdrop_core::PeerId;
use std::path::PathBuf;
use std::sync::Arc;
use webrtc::data_channel::RTCDataChannel;

/// Payload of one data-channel message. Control frames are UTF-8 text,
/// chunk frames are binary; the two never mix.
#[derive(Debug)]
pub enum ChannelData {
    Text(String),
    Binary(Bytes),
}

/// Everything the transport layer reports to the orchestrator. Handlers
/// registered on the webrtc objects only ever emit these; all state lives
/// in the orchestrator's single event loop.
pub enum SessionEvent {
    Connected(PeerId),
    Disconnected(PeerId),
    CandidateGenerated(PeerId, String),
    ChannelOpen(PeerId, Arc<RTCDataChannel>),
    ChannelMessage(PeerId, ChannelData),
    /// The negotiation window for this peer elapsed without `Connected`.
    Timeout(PeerId),
}

/// Requests from the public handle into the orchestrator.
pub enum Command {
    SendFile { path: PathBuf },
    Shutdown,
}
