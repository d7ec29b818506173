mod peer;
mod room;
mod signaling;
mod transfer;

pub use peer::PeerId;
pub use room::RoomId;
pub use signaling::{ClientSignal, ServerSignal};
pub use transfer::{Transfer, TransferDirection, TransferId, TransferStatus, percent_of};
