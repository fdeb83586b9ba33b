//! Canonical content hashing for results and commitments.

use crate::{COMMITMENT_DOMAIN, RESULT_DOMAIN};
use agora_types::{ParticipantId, TopicId};
use serde::{Deserialize, Serialize};

/// The canonical hash of an `(addresses, powers)` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultHash(pub [u8; 32]);

impl ResultHash {
    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ResultHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...", &self.to_hex()[..8])
    }
}

/// The replay-protection unit: a hash binding a result to its topic, block
/// reference, and nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...", &self.to_hex()[..8])
    }
}

/// Hash the ordered `(addresses, powers)` arrays.
///
/// Domain-prefixed and length-prefixed, so any reordering, truncation, or
/// extension of either array changes the hash. Callers are expected to pass
/// the canonical ascending-id arrays from `agora-power`; this function hashes
/// exactly what it is given.
pub fn result_hash(addresses: &[ParticipantId], powers: &[u64]) -> ResultHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(RESULT_DOMAIN);
    hasher.update(&(addresses.len() as u64).to_le_bytes());
    for address in addresses {
        hasher.update(address.as_bytes());
    }
    hasher.update(&(powers.len() as u64).to_le_bytes());
    for power in powers {
        hasher.update(&power.to_le_bytes());
    }
    ResultHash(*hasher.finalize().as_bytes())
}

/// Compute the attestation commitment binding all four fields.
pub fn commitment(
    result_hash: ResultHash,
    topic: TopicId,
    block_ref: u64,
    nonce: u64,
) -> Commitment {
    let mut hasher = blake3::Hasher::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update(result_hash.as_bytes());
    hasher.update(&topic.as_u64().to_le_bytes());
    hasher.update(&block_ref.to_le_bytes());
    hasher.update(&nonce.to_le_bytes());
    Commitment(*hasher.finalize().as_bytes())
}
