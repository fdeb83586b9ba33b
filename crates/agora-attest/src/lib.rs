//! Attestation Protocol
//!
//! An off-chain computation unit claims a voting-power result; this crate
//! decides whether that claim can be trusted. Trust requires:
//!
//! 1. the claimed result hash matches the canonical hash of the supplied
//!    `(addresses, powers)` arrays ([`result_hash`]);
//! 2. at least M of the N authorized operators signed the hash
//!    ([`verify_multi_signature`]);
//! 3. the attestation's block reference is neither from the future nor older
//!    than the freshness window ([`verify_block_freshness`]);
//! 4. the attestation's [`commitment`] has not been seen before (tracked by
//!    the consumer, see `agora-ledger`).
//!
//! # Signatures
//!
//! Operators sign with ed25519. An [`OperatorSignature`] carries the
//! signer's 32-byte verifying key next to the 64-byte signature; recovering
//! the signer means parsing that key and verifying the signature over the
//! domain-separated digest of the result hash. A record that "recovers" to
//! an authorized operator therefore required that operator's private key.
//!
//! Everything here is pure and stateless: multiple operators can compute and
//! sign concurrently with no coordination, because the result hash is a pure
//! function of the snapshot.

mod error;
mod freshness;
mod hash;
mod operators;
mod record;
mod signature;

pub use error::{AttestError, Result};
pub use freshness::verify_block_freshness;
pub use hash::{commitment, result_hash, Commitment, ResultHash};
pub use operators::{OperatorId, OperatorSet};
pub use record::AttestationRecord;
pub use signature::{
    recover_signer, sign_result, verify_multi_signature, verify_operator_signature,
    OperatorSignature,
};

/// Domain prefix for operator signatures over a result hash.
pub(crate) const SIGN_DOMAIN: &[u8] = b"agora/attest/v1";

/// Domain prefix for result hashing.
pub(crate) const RESULT_DOMAIN: &[u8] = b"agora/result/v1";

/// Domain prefix for attestation commitments.
pub(crate) const COMMITMENT_DOMAIN: &[u8] = b"agora/commitment/v1";
