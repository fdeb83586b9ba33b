//! Block-reference freshness checks.
//!
//! The off-chain unit computes over a snapshot taken at some block
//! reference; state drift between that reference and acceptance time is
//! bounded by a freshness window rather than by locking. A reference from
//! the future is always rejected - it cannot correspond to any snapshot the
//! consumer can audit.

use crate::error::{AttestError, Result};

/// Check that an attested block reference is usable at the current one.
///
/// Rejects `FutureBlock` when `attested > current` and `StaleBlock` when the
/// reference is more than `max_age` behind. `max_age` of 0 requires the
/// attestation to be taken at exactly the current reference.
pub fn verify_block_freshness(attested: u64, current: u64, max_age: u64) -> Result<()> {
    if attested > current {
        return Err(AttestError::FutureBlock { attested, current });
    }
    if current - attested > max_age {
        return Err(AttestError::StaleBlock {
            attested,
            current,
            max_age,
        });
    }
    Ok(())
}
