pub mod client;
pub mod config;
pub mod session;
pub mod signaling;
pub mod state;
pub mod transfer;
pub mod transport;

pub use client::{ClientError, PeerDropClient};
pub use config::ClientConfig;
pub use state::{ConnectionState, ConnectionStatus};
