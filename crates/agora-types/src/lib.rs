//! Base identifier types for the Agora delegation system.
//!
//! Everything else in the workspace keys its state by these two identifiers:
//!
//! - [`ParticipantId`] — an opaque 32-byte account identifier. No internal
//!   structure is assumed beyond equality and ordering; the byte-lexicographic
//!   `Ord` is the canonical order used wherever determinism matters (sorted
//!   aggregation output, hashed address arrays).
//! - [`TopicId`] — an integer scope. All delegation state is partitioned by
//!   topic; two topics never share edges, flags, or accepted results.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// An opaque 32-byte participant identifier (account key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub [u8; 32]);

impl ParticipantId {
    /// Create an id from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 hex chars
        write!(f, "{}...", &self.to_hex()[..8])
    }
}

/// An integer topic scope partitioning all delegation state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TopicId(pub u64);

impl TopicId {
    /// The raw topic number.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TopicId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "topic:{}", self.0)
    }
}

/// Current unix time in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_hex_roundtrip() {
        let id = ParticipantId::from_bytes([7u8; 32]);
        let hex = id.to_hex();
        let parsed = ParticipantId::from_hex(&hex).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn participant_hex_rejects_short_input() {
        assert!(ParticipantId::from_hex("abcd").is_err());
    }

    #[test]
    fn participant_ordering_is_lexicographic() {
        let mut low = [0u8; 32];
        let mut high = [0u8; 32];
        low[0] = 1;
        high[0] = 2;
        assert!(ParticipantId(low) < ParticipantId(high));

        // Later bytes only matter when earlier bytes tie
        let mut tail = low;
        tail[31] = 255;
        assert!(ParticipantId(low) < ParticipantId(tail));
        assert!(ParticipantId(tail) < ParticipantId(high));
    }

    #[test]
    fn topic_display() {
        assert_eq!(TopicId(42).to_string(), "topic:42");
    }
}
