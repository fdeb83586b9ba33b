//! Power Ledger
//!
//! The consumer boundary of the attestation protocol: accepts submitted
//! attestations, runs the full acceptance pipeline, and publishes the most
//! recently accepted voting-power snapshot per topic for downstream proposal
//! voting and reward-rate computation.
//!
//! # Acceptance pipeline
//!
//! A submission is accepted iff, in order:
//!
//! 1. its arrays are well-formed: equal length, addresses strictly
//!    ascending in canonical order (signatures attest to a hash, not to the
//!    shape of the arrays behind it);
//! 2. its claimed result hash matches the hash recomputed over the supplied
//!    arrays;
//! 3. an M-of-N operator quorum signed that hash;
//! 4. its block reference is fresh (not future, within the max-age window);
//! 5. its commitment is novel.
//!
//! Rejection is terminal for that submission; a corrected or refreshed
//! result is a *new* submission with a new nonce and block reference. The
//! seen-commitment set only grows, so a superseded result's commitment stays
//! rejected forever.

use agora_attest::{
    commitment, result_hash, verify_block_freshness, verify_multi_signature, AttestError,
    Commitment, OperatorId, OperatorSet, OperatorSignature, Result, ResultHash,
};
use agora_types::{ParticipantId, TopicId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// Everything an off-chain computation unit submits for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationSubmission {
    /// Topic the result covers.
    pub topic: TopicId,
    /// Block reference the snapshot was taken at.
    pub block_ref: u64,
    /// Submitter-chosen nonce distinguishing retries.
    pub nonce: u64,
    /// The hash the operators signed.
    pub claimed_hash: ResultHash,
    /// Terminal delegates in canonical ascending order.
    pub addresses: Vec<ParticipantId>,
    /// Aggregated powers, parallel to `addresses`.
    pub powers: Vec<u64>,
    /// Operator signatures over `claimed_hash`.
    pub signatures: Vec<OperatorSignature>,
}

/// An accepted attestation's published state, authoritative for its topic
/// until superseded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedResult {
    /// The verified result hash.
    pub result_hash: ResultHash,
    /// Terminal delegates in canonical order.
    pub addresses: Vec<ParticipantId>,
    /// Powers parallel to `addresses`.
    pub powers: Vec<u64>,
    /// Block reference the result was computed at.
    pub block_ref: u64,
    /// When the ledger accepted it (unix millis).
    pub accepted_at_ms: u64,
    /// The distinct operators whose signatures formed the quorum.
    pub signers: Vec<OperatorId>,
}

/// The acceptance outcome surfaced to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    /// The verified result hash.
    pub result_hash: ResultHash,
    /// When the ledger accepted it (unix millis).
    pub accepted_at_ms: u64,
}

/// Per-topic accepted snapshots plus the replay-rejection commitment set.
#[derive(Debug, Clone)]
pub struct PowerLedger {
    operators: OperatorSet,
    max_age: u64,
    seen: HashSet<Commitment>,
    accepted: HashMap<TopicId, AcceptedResult>,
}

impl PowerLedger {
    /// Create a ledger enforcing the given operator quorum and freshness
    /// window (in block-reference units).
    pub fn new(operators: OperatorSet, max_age: u64) -> Self {
        Self {
            operators,
            max_age,
            seen: HashSet::new(),
            accepted: HashMap::new(),
        }
    }

    /// The configured operator set.
    pub fn operators(&self) -> &OperatorSet {
        &self.operators
    }

    /// Run the acceptance pipeline on a submission.
    ///
    /// On success the result becomes the topic's authoritative snapshot and
    /// the commitment is recorded. On failure nothing is recorded and the
    /// error names the rejection reason; the submission cannot be retried
    /// as-is (a refreshed attempt needs a new nonce or block reference).
    pub fn submit(
        &mut self,
        submission: AttestationSubmission,
        current_ref: u64,
        now_ms: u64,
    ) -> Result<Accepted> {
        match self.validate(&submission, current_ref) {
            Ok(signers) => {
                let commit = commitment(
                    submission.claimed_hash,
                    submission.topic,
                    submission.block_ref,
                    submission.nonce,
                );
                self.seen.insert(commit);
                info!(
                    topic = %submission.topic,
                    result_hash = %submission.claimed_hash,
                    signers = signers.len(),
                    "attestation accepted"
                );
                let accepted = Accepted {
                    result_hash: submission.claimed_hash,
                    accepted_at_ms: now_ms,
                };
                self.accepted.insert(
                    submission.topic,
                    AcceptedResult {
                        result_hash: submission.claimed_hash,
                        addresses: submission.addresses,
                        powers: submission.powers,
                        block_ref: submission.block_ref,
                        accepted_at_ms: now_ms,
                        signers,
                    },
                );
                Ok(accepted)
            }
            Err(err) => {
                warn!(
                    topic = %submission.topic,
                    result_hash = %submission.claimed_hash,
                    reason = %err,
                    "attestation rejected"
                );
                Err(err)
            }
        }
    }

    fn validate(
        &self,
        submission: &AttestationSubmission,
        current_ref: u64,
    ) -> Result<Vec<OperatorId>> {
        // Structural checks first: a quorum can sign the hash of arrays in
        // any shape, so signatures prove nothing about parallel lengths or
        // canonical order. Both are required for the query surface.
        if submission.addresses.len() != submission.powers.len() {
            return Err(AttestError::ArrayLengthMismatch {
                addresses: submission.addresses.len(),
                powers: submission.powers.len(),
            });
        }
        if !submission.addresses.windows(2).all(|w| w[0] < w[1]) {
            return Err(AttestError::NonCanonicalAddresses);
        }

        let computed = result_hash(&submission.addresses, &submission.powers);
        if computed != submission.claimed_hash {
            return Err(AttestError::ResultHashMismatch {
                claimed: submission.claimed_hash,
                computed,
            });
        }

        let signers =
            verify_multi_signature(&submission.claimed_hash, &submission.signatures, &self.operators)?;

        verify_block_freshness(submission.block_ref, current_ref, self.max_age)?;

        let commit = commitment(
            submission.claimed_hash,
            submission.topic,
            submission.block_ref,
            submission.nonce,
        );
        if self.seen.contains(&commit) {
            return Err(AttestError::ReplayedCommitment { commitment: commit });
        }

        Ok(signers)
    }

    /// The published power for a participant, 0 when the topic has no
    /// accepted result or the participant holds none.
    pub fn voting_power(&self, topic: TopicId, participant: ParticipantId) -> u64 {
        let Some(result) = self.accepted.get(&topic) else {
            return 0;
        };
        // Addresses are in canonical ascending order.
        match result.addresses.binary_search(&participant) {
            Ok(index) => result.powers[index],
            Err(_) => 0,
        }
    }

    /// The currently authoritative result for a topic, if any.
    pub fn accepted(&self, topic: TopicId) -> Option<&AcceptedResult> {
        self.accepted.get(&topic)
    }

    /// Whether a commitment was already accepted.
    pub fn has_seen(&self, commit: &Commitment) -> bool {
        self.seen.contains(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_attest::sign_result;
    use agora_power::{canonical_result, voting_power, GraphSnapshot, PowerEntry};
    use ed25519_dalek::SigningKey;

    const TOPIC: TopicId = TopicId(1);

    fn p(seed: u8) -> ParticipantId {
        ParticipantId::from_bytes([seed; 32])
    }

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn operator_keys() -> Vec<SigningKey> {
        (1..=4).map(key).collect()
    }

    fn ledger(threshold: usize, max_age: u64) -> PowerLedger {
        let set = OperatorSet::new(
            operator_keys()
                .iter()
                .map(|k| OperatorId(k.verifying_key().to_bytes())),
            threshold,
        )
        .unwrap();
        PowerLedger::new(set, max_age)
    }

    /// A submission for `{p(3): 4, p(6): 2}` signed by the first `signers`
    /// operators.
    fn submission(block_ref: u64, nonce: u64, signers: usize) -> AttestationSubmission {
        let entries = vec![
            PowerEntry {
                delegate: p(3),
                power: 4,
            },
            PowerEntry {
                delegate: p(6),
                power: 2,
            },
        ];
        let (addresses, powers) = canonical_result(&entries);
        let claimed_hash = result_hash(&addresses, &powers);
        let signatures = operator_keys()
            .iter()
            .take(signers)
            .map(|k| sign_result(&claimed_hash, k))
            .collect();
        AttestationSubmission {
            topic: TOPIC,
            block_ref,
            nonce,
            claimed_hash,
            addresses,
            powers,
            signatures,
        }
    }

    #[test]
    fn accepts_and_serves_powers() {
        let mut ledger = ledger(3, 10);
        let accepted = ledger.submit(submission(100, 1, 3), 105, 999).unwrap();
        assert_eq!(accepted.accepted_at_ms, 999);

        assert_eq!(ledger.voting_power(TOPIC, p(3)), 4);
        assert_eq!(ledger.voting_power(TOPIC, p(6)), 2);
        assert_eq!(ledger.voting_power(TOPIC, p(1)), 0);
        assert_eq!(ledger.voting_power(TopicId(9), p(3)), 0);
    }

    #[test]
    fn rejects_tampered_arrays() {
        let mut ledger = ledger(3, 10);
        let mut sub = submission(100, 1, 3);
        sub.powers[0] += 1;

        let err = ledger.submit(sub, 105, 999).unwrap_err();
        assert!(matches!(err, AttestError::ResultHashMismatch { .. }));
        assert!(ledger.accepted(TOPIC).is_none());
    }

    /// Sign arbitrary arrays with the first `signers` operators, bypassing
    /// the aggregator entirely.
    fn raw_submission(
        addresses: Vec<ParticipantId>,
        powers: Vec<u64>,
        signers: usize,
    ) -> AttestationSubmission {
        let claimed_hash = result_hash(&addresses, &powers);
        let signatures = operator_keys()
            .iter()
            .take(signers)
            .map(|k| sign_result(&claimed_hash, k))
            .collect();
        AttestationSubmission {
            topic: TOPIC,
            block_ref: 100,
            nonce: 1,
            claimed_hash,
            addresses,
            powers,
            signatures,
        }
    }

    #[test]
    fn rejects_ragged_arrays_even_with_quorum() {
        // A quorum can sign the hash of arrays of unequal length; the
        // ledger must refuse to store them or later power queries would
        // index past the shorter array.
        let mut ledger = ledger(3, 10);
        let sub = raw_submission(vec![p(1), p(2)], vec![5], 3);

        let err = ledger.submit(sub, 105, 999).unwrap_err();
        assert_eq!(
            err,
            AttestError::ArrayLengthMismatch {
                addresses: 2,
                powers: 1
            }
        );
        assert!(ledger.accepted(TOPIC).is_none());
        assert_eq!(ledger.voting_power(TOPIC, p(2)), 0);
    }

    #[test]
    fn rejects_unsorted_addresses_even_with_quorum() {
        // Out-of-order addresses would defeat the binary search serving
        // power queries, silently zeroing real holders.
        let mut ledger = ledger(3, 10);
        let sub = raw_submission(vec![p(6), p(3)], vec![2, 4], 3);

        let err = ledger.submit(sub, 105, 999).unwrap_err();
        assert_eq!(err, AttestError::NonCanonicalAddresses);
        assert!(ledger.accepted(TOPIC).is_none());
    }

    #[test]
    fn rejects_duplicate_addresses() {
        // Strict ascent also forbids a terminal listed twice.
        let mut ledger = ledger(3, 10);
        let sub = raw_submission(vec![p(3), p(3)], vec![2, 4], 3);

        assert_eq!(
            ledger.submit(sub, 105, 999).unwrap_err(),
            AttestError::NonCanonicalAddresses
        );
    }

    #[test]
    fn rejects_insufficient_quorum() {
        let mut ledger = ledger(3, 10);
        let err = ledger.submit(submission(100, 1, 2), 105, 999).unwrap_err();
        assert!(matches!(err, AttestError::InsufficientSignatures { .. }));
    }

    #[test]
    fn rejects_stale_regardless_of_signatures() {
        let mut ledger = ledger(3, 10);
        // All four operators signed, but the snapshot is too old.
        let err = ledger.submit(submission(100, 1, 4), 200, 999).unwrap_err();
        assert!(matches!(err, AttestError::StaleBlock { .. }));
    }

    #[test]
    fn rejects_future_block() {
        let mut ledger = ledger(3, 10);
        let err = ledger.submit(submission(200, 1, 3), 100, 999).unwrap_err();
        assert!(matches!(err, AttestError::FutureBlock { .. }));
    }

    #[test]
    fn rejects_replayed_commitment() {
        let mut ledger = ledger(3, 10);
        ledger.submit(submission(100, 1, 3), 105, 999).unwrap();

        let err = ledger.submit(submission(100, 1, 3), 106, 999).unwrap_err();
        assert!(matches!(err, AttestError::ReplayedCommitment { .. }));
    }

    #[test]
    fn fresh_nonce_is_not_a_replay() {
        let mut ledger = ledger(3, 10);
        ledger.submit(submission(100, 1, 3), 105, 999).unwrap();
        ledger.submit(submission(100, 2, 3), 105, 999).unwrap();
    }

    #[test]
    fn rejection_records_nothing() {
        let mut ledger = ledger(3, 10);
        let sub = submission(100, 1, 2);
        let commit = commitment(sub.claimed_hash, sub.topic, sub.block_ref, sub.nonce);

        let _ = ledger.submit(sub, 105, 999).unwrap_err();
        assert!(!ledger.has_seen(&commit));

        // The same tuple with enough signatures is accepted afterwards.
        ledger.submit(submission(100, 1, 3), 105, 999).unwrap();
        assert!(ledger.has_seen(&commit));
    }

    #[test]
    fn superseding_result_replaces_snapshot() {
        let mut ledger = ledger(3, 10);
        ledger.submit(submission(100, 1, 3), 105, 999).unwrap();

        // A later computation publishes different powers.
        let entries = vec![PowerEntry {
            delegate: p(3),
            power: 6,
        }];
        let (addresses, powers) = canonical_result(&entries);
        let claimed_hash = result_hash(&addresses, &powers);
        let signatures = operator_keys()
            .iter()
            .take(3)
            .map(|k| sign_result(&claimed_hash, k))
            .collect();
        ledger
            .submit(
                AttestationSubmission {
                    topic: TOPIC,
                    block_ref: 110,
                    nonce: 2,
                    claimed_hash,
                    addresses,
                    powers,
                    signatures,
                },
                112,
                1500,
            )
            .unwrap();

        assert_eq!(ledger.voting_power(TOPIC, p(3)), 6);
        assert_eq!(ledger.voting_power(TOPIC, p(6)), 0);
        assert_eq!(ledger.accepted(TOPIC).unwrap().block_ref, 110);

        // The superseded submission's commitment stays rejected.
        let err = ledger.submit(submission(100, 1, 3), 112, 1600).unwrap_err();
        assert!(matches!(err, AttestError::ReplayedCommitment { .. }));
    }

    #[test]
    fn powers_computed_by_aggregator_flow_through() {
        // End-to-end within the ledger crate: aggregate a small graph and
        // serve its powers after acceptance.
        let snap = GraphSnapshot::from_edges(TOPIC, [(p(1), p(3)), (p(2), p(3))]);
        let entries = voting_power(&snap, &[p(1), p(2), p(3)]).unwrap();
        let (addresses, powers) = canonical_result(&entries);
        let claimed_hash = result_hash(&addresses, &powers);
        let signatures = operator_keys()
            .iter()
            .take(3)
            .map(|k| sign_result(&claimed_hash, k))
            .collect();

        let mut ledger = ledger(3, 10);
        ledger
            .submit(
                AttestationSubmission {
                    topic: TOPIC,
                    block_ref: 50,
                    nonce: 1,
                    claimed_hash,
                    addresses,
                    powers,
                    signatures,
                },
                55,
                999,
            )
            .unwrap();

        assert_eq!(ledger.voting_power(TOPIC, p(3)), 3);
    }
}
