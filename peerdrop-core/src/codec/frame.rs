use crate::model::TransferId;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed width of the transfer-identifier prefix on every binary chunk
/// frame. Identifiers shorter than this are right-padded with spaces,
/// longer ones are truncated.
pub const TRANSFER_ID_WIDTH: usize = 36;

/// Payload bytes carried per chunk frame; the last chunk of a file may be
/// shorter.
pub const CHUNK_PAYLOAD_SIZE: usize = 16 * 1024;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("chunk frame too short: {len} bytes, need at least {TRANSFER_ID_WIDTH}")]
    TooShort { len: usize },

    #[error("transfer id prefix is not valid UTF-8")]
    IdNotUtf8,

    #[error("malformed control message: {0}")]
    BadControl(#[from] serde_json::Error),
}

/// Control frames multiplexed with binary chunks on the data channel.
/// UTF-8 JSON on the wire, dispatched by the `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    #[serde(rename = "file-start", rename_all = "camelCase")]
    FileStart {
        transfer_id: TransferId,
        name: String,
        size: u64,
        file_type: String,
    },
}

pub fn encode_control(msg: &ControlMessage) -> Result<String, FrameError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn decode_control(text: &str) -> Result<ControlMessage, FrameError> {
    Ok(serde_json::from_str(text)?)
}

/// Frame one chunk: `[36-byte id][payload]`.
pub fn encode_chunk(id: &TransferId, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(TRANSFER_ID_WIDTH + payload.len());
    let id_bytes = id.as_str().as_bytes();
    if id_bytes.len() >= TRANSFER_ID_WIDTH {
        buf.put_slice(&id_bytes[..TRANSFER_ID_WIDTH]);
    } else {
        buf.put_slice(id_bytes);
        buf.put_bytes(b' ', TRANSFER_ID_WIDTH - id_bytes.len());
    }
    buf.put_slice(payload);
    buf.freeze()
}

/// Split a binary frame back into its transfer id and payload.
pub fn decode_chunk(frame: &Bytes) -> Result<(TransferId, Bytes), FrameError> {
    if frame.len() < TRANSFER_ID_WIDTH {
        return Err(FrameError::TooShort { len: frame.len() });
    }
    let id_str =
        std::str::from_utf8(&frame[..TRANSFER_ID_WIDTH]).map_err(|_| FrameError::IdNotUtf8)?;
    let id = TransferId::from_raw(id_str.trim_end_matches(' '));
    Ok((id, frame.slice(TRANSFER_ID_WIDTH..)))
}
