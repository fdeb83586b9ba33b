//! Attestation records.

use crate::hash::{commitment, Commitment, ResultHash};
use crate::signature::OperatorSignature;
use agora_types::TopicId;
use serde::{Deserialize, Serialize};

/// A claimed result plus the operator signatures asserting its correctness.
///
/// Records are write-once: a superseding result for the same topic is a new
/// record with a fresh nonce and block reference, never an update. The
/// record's [`commitment`](Self::commitment) is the unit of replay
/// protection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// The canonical hash of the claimed `(addresses, powers)` result.
    pub result_hash: ResultHash,
    /// Topic the result covers.
    pub topic: TopicId,
    /// Block reference the snapshot was taken at.
    pub block_ref: u64,
    /// Operator signatures over `result_hash`.
    pub signatures: Vec<OperatorSignature>,
    /// Submitter-chosen nonce distinguishing retries.
    pub nonce: u64,
}

impl AttestationRecord {
    /// The replay-protection commitment for this record.
    pub fn commitment(&self) -> Commitment {
        commitment(self.result_hash, self.topic, self.block_ref, self.nonce)
    }
}
