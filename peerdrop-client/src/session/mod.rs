mod event;
mod orchestrator;
mod peer_session;

pub use event::{ChannelData, Command, SessionEvent};
pub use orchestrator::Orchestrator;
pub use peer_session::{PeerSession, SessionState};
