pub mod codec;
pub mod ledger;
pub mod model;

pub use codec::{CHUNK_PAYLOAD_SIZE, ControlMessage, FrameError, TRANSFER_ID_WIDTH};
pub use ledger::TransferLedger;
pub use model::{
    ClientSignal, PeerId, RoomId, ServerSignal, Transfer, TransferDirection, TransferId,
    TransferStatus, percent_of,
};
