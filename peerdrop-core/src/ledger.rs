use crate::model::{Transfer, TransferId, TransferStatus};
use bytes::Bytes;
use std::collections::HashMap;

/// Insertion-ordered collection of transfers keyed by id. One instance
/// tracks incoming transfers, another outgoing; entries are appended once
/// and afterwards only merge-updated in place, never overwritten.
#[derive(Default)]
pub struct TransferLedger {
    order: Vec<TransferId>,
    entries: HashMap<TransferId, Transfer>,
}

impl TransferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new transfer. Refused (returns false) when the id already
    /// exists; existing entries are never replaced.
    pub fn append(&mut self, transfer: Transfer) -> bool {
        if self.entries.contains_key(&transfer.id) {
            return false;
        }
        self.order.push(transfer.id.clone());
        self.entries.insert(transfer.id.clone(), transfer);
        true
    }

    pub fn get(&self, id: &TransferId) -> Option<&Transfer> {
        self.entries.get(id)
    }

    /// Transfers in insertion order, for display.
    pub fn iter(&self) -> impl Iterator<Item = &Transfer> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Raise progress for `id` and flip a pending entry to transferring.
    pub fn advance(&mut self, id: &TransferId, percent: u8) {
        if let Some(t) = self.entries.get_mut(id) {
            t.advance_progress(percent);
            if t.status == TransferStatus::Pending {
                t.status = TransferStatus::Transferring;
            }
        }
    }

    /// Mark `id` completed at 100%, attaching the reassembled payload when
    /// there is one (incoming side).
    pub fn complete(&mut self, id: &TransferId, payload: Option<Bytes>) {
        if let Some(t) = self.entries.get_mut(id) {
            t.advance_progress(100);
            t.status = TransferStatus::Completed;
            if payload.is_some() {
                t.payload = payload;
            }
        }
    }

    /// Mark `id` failed unless it already completed.
    pub fn fail(&mut self, id: &TransferId) {
        if let Some(t) = self.entries.get_mut(id)
            && t.status != TransferStatus::Completed
        {
            t.status = TransferStatus::Failed;
        }
    }

    /// Reassembled payload of a completed transfer, if available.
    pub fn payload(&self, id: &TransferId) -> Option<Bytes> {
        self.entries
            .get(id)
            .filter(|t| t.status == TransferStatus::Completed)
            .and_then(|t| t.payload.clone())
    }
}
