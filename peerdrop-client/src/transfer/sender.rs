use crate::state::SharedState;
use anyhow::{Result, bail};
use peerdrop_core::codec::{CHUNK_PAYLOAD_SIZE, ControlMessage, encode_chunk, encode_control};
use peerdrop_core::{PeerId, TransferId, percent_of};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;

/// Stop queueing new chunks while the channel's buffered amount is above
/// this watermark.
const BUFFER_HIGH_WATERMARK: usize = 1024 * 1024;
const BUFFER_POLL_INTERVAL: Duration = Duration::from_millis(10);
const BUFFER_DRAIN_DEADLINE: Duration = Duration::from_secs(10);

/// Streams one file over an open data channel: a `file-start` control frame
/// followed by fixed-size chunk frames. Ledger progress for `id` is updated
/// as chunks are handed to the channel.
pub async fn send_to_peer(
    dc: Arc<RTCDataChannel>,
    remote: PeerId,
    id: TransferId,
    path: PathBuf,
    name: String,
    size: u64,
    mime_type: String,
    shared: Arc<SharedState>,
) {
    if let Err(e) = run(&dc, &id, &path, name, size, mime_type, &shared).await {
        tracing::warn!(peer = %remote, transfer = %id.as_str(), "Send failed: {e}");
        shared.fail_outgoing(&id);
    }
}

async fn run(
    dc: &Arc<RTCDataChannel>,
    id: &TransferId,
    path: &std::path::Path,
    name: String,
    size: u64,
    mime_type: String,
    shared: &SharedState,
) -> Result<()> {
    if dc.ready_state() != RTCDataChannelState::Open {
        bail!("data channel is not open");
    }

    let start = ControlMessage::FileStart {
        transfer_id: id.clone(),
        name,
        size,
        file_type: mime_type,
    };
    dc.send_text(encode_control(&start)?).await?;
    shared.advance_outgoing(id, 0);

    let mut file = tokio::fs::File::open(path).await?;
    let mut buf = vec![0u8; CHUNK_PAYLOAD_SIZE];
    let mut sent: u64 = 0;

    loop {
        let n = file.read(&mut buf).await?;
        // A zero-byte file still announces itself with one empty chunk.
        if n == 0 && sent > 0 {
            break;
        }
        wait_for_buffer_space(dc).await?;
        dc.send(&encode_chunk(id, &buf[..n])).await?;
        sent += n as u64;
        shared.advance_outgoing(id, percent_of(sent, size));
        if n == 0 {
            break;
        }
    }

    shared.complete_outgoing(id);
    Ok(())
}

/// Polls the channel's buffered amount until it drains below the high
/// watermark, so a fast reader never forces unbounded SCTP queueing.
async fn wait_for_buffer_space(dc: &Arc<RTCDataChannel>) -> Result<()> {
    let deadline = tokio::time::Instant::now() + BUFFER_DRAIN_DEADLINE;
    while dc.buffered_amount().await > BUFFER_HIGH_WATERMARK {
        if dc.ready_state() != RTCDataChannelState::Open {
            bail!("data channel closed while draining");
        }
        if tokio::time::Instant::now() >= deadline {
            bail!("data channel buffer did not drain");
        }
        tokio::time::sleep(BUFFER_POLL_INTERVAL).await;
    }
    Ok(())
}
