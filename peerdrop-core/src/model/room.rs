use serde::{Deserialize, Serialize};
use std::fmt;

/// Room identifier. Opaque string, case-normalized so that `abc123` and
/// `ABC123` name the same rendezvous group.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(from = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
