//! Voting-Power Aggregation
//!
//! Computes per-terminal-delegate voting power from a delegation graph
//! snapshot and a universe of eligible voters. This crate is deliberately
//! independent of the authoritative [`agora_graph`] engine: the off-chain
//! computation unit re-derives the same snapshot from external data and runs
//! the same aggregation, so every traversal here validates defensively
//! (cycles are *reported*, never assumed impossible) even though the engine's
//! invariants make them unreachable on authoritative state.
//!
//! # Determinism
//!
//! Independent operators must produce byte-identical results for the same
//! underlying state. Two orderings are part of the public contract:
//!
//! - [`voting_power`] output: power descending, ties broken by ascending
//!   participant id.
//! - [`canonical_result`] arrays (the hashing input): ascending participant
//!   id.

mod aggregate;
mod snapshot;
mod validate;

pub use aggregate::{canonical_result, voting_power, PowerEntry};
pub use snapshot::GraphSnapshot;
pub use validate::{detect_cycles, validate, GraphReport, GraphViolation};

use agora_types::ParticipantId;
use thiserror::Error;

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, PowerError>;

/// Errors raised while aggregating over a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerError {
    /// A forward walk revisited a node. Unreachable on state produced by the
    /// graph engine; reachable on externally supplied or stale snapshots.
    #[error("delegation cycle detected at {at}")]
    CycleDetected { at: ParticipantId },
}
