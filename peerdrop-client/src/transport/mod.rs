mod connection;

pub use connection::PeerConnection;

/// Label of the single data channel carrying control and chunk frames.
pub const DATA_CHANNEL_LABEL: &str = "fileTransfer";
