mod frame;
mod reassembly;

pub use frame::{
    CHUNK_PAYLOAD_SIZE, ControlMessage, FrameError, TRANSFER_ID_WIDTH, decode_chunk,
    decode_control, encode_chunk, encode_control,
};
pub use reassembly::{ChunkOutcome, Reassembly};
