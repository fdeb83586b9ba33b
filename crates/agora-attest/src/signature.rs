//! Operator signatures and quorum verification.

use crate::error::{AttestError, Result};
use crate::hash::ResultHash;
use crate::operators::{OperatorId, OperatorSet};
use crate::SIGN_DOMAIN;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wire size of a signature record: 32-byte verifying key + 64-byte
/// signature.
pub const SIGNATURE_RECORD_LEN: usize = 96;

/// One operator's signature over a result hash.
///
/// Carries the signer's verifying key so the signer identity can be
/// recovered from the record alone; forging a record that recovers to a
/// given operator requires that operator's private key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSignature {
    /// The signer's ed25519 verifying key.
    pub signer: [u8; 32],
    /// Signature over the domain-separated digest of the result hash.
    #[serde(with = "signature_serde")]
    pub signature: [u8; 64],
}

impl OperatorSignature {
    /// Parse from the 96-byte wire layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_RECORD_LEN {
            return Err(AttestError::InvalidSignatureLength { len: bytes.len() });
        }
        let mut signer = [0u8; 32];
        signer.copy_from_slice(&bytes[..32]);
        let mut signature = [0u8; 64];
        signature.copy_from_slice(&bytes[32..]);
        Ok(Self { signer, signature })
    }

    /// Serialize to the 96-byte wire layout.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_RECORD_LEN] {
        let mut out = [0u8; SIGNATURE_RECORD_LEN];
        out[..32].copy_from_slice(&self.signer);
        out[32..].copy_from_slice(&self.signature);
        out
    }
}

/// The message operators actually sign: domain prefix plus result hash.
fn signing_message(result_hash: &ResultHash) -> Vec<u8> {
    let mut msg = Vec::with_capacity(SIGN_DOMAIN.len() + 32);
    msg.extend_from_slice(SIGN_DOMAIN);
    msg.extend_from_slice(result_hash.as_bytes());
    msg
}

/// Sign a result hash (operator side).
pub fn sign_result(result_hash: &ResultHash, signing_key: &SigningKey) -> OperatorSignature {
    let signature = signing_key.sign(&signing_message(result_hash));
    OperatorSignature {
        signer: signing_key.verifying_key().to_bytes(),
        signature: signature.to_bytes(),
    }
}

/// Recover the signer identity from a signature record.
///
/// Parses the embedded verifying key and verifies the signature over the
/// domain-separated digest; both failures surface as
/// [`AttestError::SignatureVerificationFailed`].
pub fn recover_signer(result_hash: &ResultHash, sig: &OperatorSignature) -> Result<OperatorId> {
    let verifying_key = VerifyingKey::from_bytes(&sig.signer)
        .map_err(|_| AttestError::SignatureVerificationFailed)?;
    let signature = Signature::from_bytes(&sig.signature);

    verifying_key
        .verify(&signing_message(result_hash), &signature)
        .map_err(|_| AttestError::SignatureVerificationFailed)?;

    Ok(OperatorId(sig.signer))
}

/// Recover a signer and check membership in the authorized set.
pub fn verify_operator_signature(
    result_hash: &ResultHash,
    sig: &OperatorSignature,
    set: &OperatorSet,
) -> Result<OperatorId> {
    let signer = recover_signer(result_hash, sig)?;
    if !set.contains(&signer) {
        return Err(AttestError::UnauthorizedOperator { signer });
    }
    Ok(signer)
}

/// Verify an M-of-N quorum over a result hash.
///
/// Individually malformed or unauthorized signatures are skipped, not
/// aborted on - noise from one operator's tooling cannot veto a quorum.
/// Signers are deduplicated by recovered identity, and verification
/// short-circuits once M distinct valid signers are found. Returns the
/// signer identities (truncated to M).
///
/// Fewer records than the threshold fails before any signature is
/// examined; that rejection reports `found: 0` because nothing was
/// verified, not because the records present were invalid.
pub fn verify_multi_signature(
    result_hash: &ResultHash,
    signatures: &[OperatorSignature],
    set: &OperatorSet,
) -> Result<Vec<OperatorId>> {
    let required = set.threshold();

    // Fewer records than the threshold can never quorum; bail before any
    // signature math. `found: 0` here means "none verified", not "none
    // valid".
    if signatures.len() < required {
        return Err(AttestError::InsufficientSignatures {
            found: 0,
            required,
        });
    }

    let mut signers: BTreeSet<OperatorId> = BTreeSet::new();
    for sig in signatures {
        match verify_operator_signature(result_hash, sig, set) {
            Ok(signer) => {
                signers.insert(signer);
                if signers.len() >= required {
                    return Ok(signers.into_iter().collect());
                }
            }
            // Skip and keep looking; only the distinct-valid count matters.
            Err(_) => continue,
        }
    }

    Err(AttestError::InsufficientSignatures {
        found: signers.len(),
        required,
    })
}

/// Hex serde for 64-byte signature arrays.
pub mod signature_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex::encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 64], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        if bytes.len() != 64 {
            return Err(serde::de::Error::custom("expected 64 bytes"));
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(arr)
    }
}
