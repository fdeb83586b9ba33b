//! Authorized operator configuration.

use crate::error::{AttestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An operator identity: the 32 bytes of an ed25519 verifying key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub [u8; 32]);

impl OperatorId {
    /// Get the raw key bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...", &hex::encode(self.0)[..8])
    }
}

impl From<&ed25519_dalek::VerifyingKey> for OperatorId {
    fn from(key: &ed25519_dalek::VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

/// The fixed M-of-N operator configuration. Read-only to this core; it is
/// supplied by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSet {
    authorized: BTreeSet<OperatorId>,
    threshold: usize,
}

impl OperatorSet {
    /// Create a set requiring `threshold` distinct signers out of
    /// `authorized`.
    ///
    /// Rejects a zero threshold and a threshold larger than the set, both of
    /// which would make every attestation undecidable or trivially accepted.
    pub fn new(
        authorized: impl IntoIterator<Item = OperatorId>,
        threshold: usize,
    ) -> Result<Self> {
        let authorized: BTreeSet<OperatorId> = authorized.into_iter().collect();
        if threshold == 0 || threshold > authorized.len() {
            return Err(AttestError::InvalidOperatorSet {
                threshold,
                operators: authorized.len(),
            });
        }
        Ok(Self {
            authorized,
            threshold,
        })
    }

    /// The required number of distinct valid signers (M).
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Total authorized operators (N).
    pub fn len(&self) -> usize {
        self.authorized.len()
    }

    /// Check if no operators are configured (unreachable via `new`).
    pub fn is_empty(&self) -> bool {
        self.authorized.is_empty()
    }

    /// Membership check.
    pub fn contains(&self, operator: &OperatorId) -> bool {
        self.authorized.contains(operator)
    }

    /// Iterate the authorized identities in ascending order.
    pub fn operators(&self) -> impl Iterator<Item = &OperatorId> {
        self.authorized.iter()
    }
}
