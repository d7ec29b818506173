use crate::codec::frame::{FrameError, decode_chunk};
use crate::model::{PeerId, TransferId, percent_of};
use bytes::{Bytes, BytesMut};
use std::collections::HashMap;

/// Result of feeding one binary frame into the reassembly map.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// Chunk accepted, transfer still in flight.
    Progress { id: TransferId, progress: u8 },
    /// Final chunk accepted; the payload is the fully reassembled file.
    /// The pending entry has been evicted.
    Completed { id: TransferId, payload: Bytes },
    /// No pending transfer matches the frame's identifier (never announced,
    /// or already completed). The frame is dropped.
    Unknown { id: TransferId },
}

struct Pending {
    chunks: Vec<Bytes>,
    received: u64,
    total: u64,
    peer: PeerId,
}

/// Receiver-side reassembly state: one buffer per announced transfer,
/// keyed by transfer id. Entries are evicted on completion and when the
/// owning peer session goes away; they never accumulate.
#[derive(Default)]
pub struct Reassembly {
    pending: HashMap<TransferId, Pending>,
}

impl Reassembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an announced transfer. Returns false (and changes nothing)
    /// if the id is already pending.
    pub fn start(&mut self, id: TransferId, total: u64, peer: PeerId) -> bool {
        if self.pending.contains_key(&id) {
            return false;
        }
        self.pending.insert(
            id,
            Pending {
                chunks: Vec::new(),
                received: 0,
                total,
                peer,
            },
        );
        true
    }

    pub fn is_pending(&self, id: &TransferId) -> bool {
        self.pending.contains_key(id)
    }

    /// Feed one binary frame. Malformed frames surface as errors; frames
    /// for unknown transfers are reported (and dropped) without touching
    /// any other pending transfer.
    pub fn accept(&mut self, frame: &Bytes) -> Result<ChunkOutcome, FrameError> {
        let (id, payload) = decode_chunk(frame)?;

        let Some(pending) = self.pending.get_mut(&id) else {
            return Ok(ChunkOutcome::Unknown { id });
        };

        pending.received += payload.len() as u64;
        pending.chunks.push(payload);

        if pending.received >= pending.total {
            let pending = self.pending.remove(&id).unwrap_or_else(|| unreachable!());
            let mut assembled = BytesMut::with_capacity(pending.received as usize);
            for chunk in &pending.chunks {
                assembled.extend_from_slice(chunk);
            }
            return Ok(ChunkOutcome::Completed {
                id,
                payload: assembled.freeze(),
            });
        }

        let progress = percent_of(pending.received, pending.total);
        Ok(ChunkOutcome::Progress { id, progress })
    }

    /// Drop every pending transfer owned by `peer`, returning their ids so
    /// the caller can mark the ledger entries failed.
    pub fn evict_peer(&mut self, peer: &PeerId) -> Vec<TransferId> {
        let ids: Vec<TransferId> = self
            .pending
            .iter()
            .filter(|(_, p)| &p.peer == peer)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &ids {
            self.pending.remove(id);
        }
        ids
    }
}
