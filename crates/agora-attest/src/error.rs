//! Error types for agora-attest.

use crate::hash::{Commitment, ResultHash};
use crate::operators::OperatorId;
use thiserror::Error;

/// Result type for attestation operations.
pub type Result<T> = std::result::Result<T, AttestError>;

/// Rejections raised while verifying an attestation.
///
/// During quorum verification the first three variants apply to *individual*
/// signatures and cause that signature to be skipped, not the whole check to
/// abort; the rest reject the attestation as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttestError {
    /// A raw signature blob has the wrong length.
    #[error("signature record is {len} bytes, expected 96")]
    InvalidSignatureLength { len: usize },

    /// The signature does not verify against its claimed key.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// The recovered signer is not in the authorized operator set.
    #[error("signer {signer} is not an authorized operator")]
    UnauthorizedOperator { signer: OperatorId },

    /// Fewer than the required distinct valid signers were found.
    ///
    /// `found` is the number of distinct valid signers counted before
    /// giving up. When fewer records than the threshold arrive, quorum
    /// verification rejects before examining any of them and `found` is 0.
    #[error("found {found} distinct valid signers, required {required}")]
    InsufficientSignatures { found: usize, required: usize },

    /// The attested block reference is ahead of the current one.
    #[error("attested block {attested} is ahead of current block {current}")]
    FutureBlock { attested: u64, current: u64 },

    /// The attested block reference is older than the freshness window.
    #[error("attested block {attested} is older than block {current} by more than {max_age}")]
    StaleBlock {
        attested: u64,
        current: u64,
        max_age: u64,
    },

    /// This exact commitment was already accepted.
    #[error("commitment {commitment} was already accepted")]
    ReplayedCommitment { commitment: Commitment },

    /// The claimed result hash does not match the supplied arrays.
    #[error("claimed result hash {claimed} does not match computed {computed}")]
    ResultHashMismatch {
        claimed: ResultHash,
        computed: ResultHash,
    },

    /// The addresses and powers arrays differ in length.
    #[error("addresses ({addresses}) and powers ({powers}) arrays differ in length")]
    ArrayLengthMismatch { addresses: usize, powers: usize },

    /// The addresses array is not in strictly ascending canonical order.
    ///
    /// Operators only attest to the hash of the bytes they were handed, so
    /// a quorum signature does not certify the shape of the arrays; the
    /// consumer re-checks canonical form before trusting them.
    #[error("addresses array is not in strictly ascending canonical order")]
    NonCanonicalAddresses,

    /// The operator set configuration is unusable.
    #[error("invalid operator set: threshold {threshold} with {operators} operators")]
    InvalidOperatorSet { threshold: usize, operators: usize },
}
