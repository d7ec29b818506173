use crate::model::peer::PeerId;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transfer identifier, unique per originating send. The hyphenated UUID
/// form is exactly 36 characters, which is also the fixed width of the
/// identifier field in the chunk wire format.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct TransferId(String);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    Pending,
    Transferring,
    Completed,
    Failed,
}

/// One file-send operation, tracked end to end. Ledger entries survive
/// completion so the payload stays retrievable; only the presentation
/// layer ever discards them.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub id: TransferId,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub direction: TransferDirection,
    /// Rounded percentage, monotonically non-decreasing.
    pub progress: u8,
    pub status: TransferStatus,
    /// Sending peer for incoming transfers. Outgoing transfers fan out to
    /// every connected peer and carry no single remote id.
    pub peer: Option<PeerId>,
    /// Reassembled bytes, present once an incoming transfer completes.
    pub payload: Option<Bytes>,
}

impl Transfer {
    pub fn outgoing(id: TransferId, name: String, size: u64, mime_type: String) -> Self {
        Self {
            id,
            name,
            size,
            mime_type,
            direction: TransferDirection::Outgoing,
            progress: 0,
            status: TransferStatus::Pending,
            peer: None,
            payload: None,
        }
    }

    pub fn incoming(
        id: TransferId,
        name: String,
        size: u64,
        mime_type: String,
        peer: PeerId,
    ) -> Self {
        Self {
            id,
            name,
            size,
            mime_type,
            direction: TransferDirection::Incoming,
            progress: 0,
            status: TransferStatus::Transferring,
            peer: Some(peer),
            payload: None,
        }
    }

    /// Raise progress to `percent` if that is an increase; regressions are
    /// ignored so observed progress never moves backwards.
    pub fn advance_progress(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent > self.progress {
            self.progress = percent;
        }
    }
}

/// Rounded percentage for `done` bytes out of `total`, capped at 100.
pub fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let ratio = (done as f64 / total as f64).min(1.0);
    (ratio * 100.0).round() as u8
}
