//! Delegation Graph Engine
//!
//! Topic-scoped liquid-democracy delegation: each participant may delegate
//! their vote, per topic, to exactly one other participant. The per-topic
//! edge set therefore forms a **functional graph** (out-degree 0 or 1 per
//! node), and this crate owns every structural invariant on it:
//!
//! - no self-delegation
//! - acyclicity (checked with a single forward walk - out-degree <= 1 means
//!   no general DFS is needed)
//! - chain depth bounded by [`MAX_DEPTH`]
//! - dead-end protection (a participant may opt out of receiving *new*
//!   delegations)
//!
//! # Design
//!
//! State lives in [`DelegationStore`], a plain map keyed by
//! `(topic, participant)` - no pointer-based node objects, so the
//! out-degree-<=-1 invariant holds by construction. The store is mutated only
//! through [`DelegationGraphEngine`], whose operations fail fast with a typed
//! [`GraphError`] and never leave partial state behind.
//!
//! Every forward walk is capped at [`WALK_CAP`] iterations. The cap is a
//! defensive guard against corrupted or externally supplied state, not a cost
//! model: with intact invariants no walk exceeds `MAX_DEPTH` hops.

mod engine;
mod error;
mod store;

pub use engine::{DelegationGraphEngine, DelegationInfo, StaticTopics, TopicDirectory};
pub use error::{GraphError, Result};
pub use store::{DeadEndFlag, DelegationEdge, DelegationStore};

/// Maximum allowed delegation chain length.
pub const MAX_DEPTH: u8 = 7;

/// Safety cap on every forward walk.
///
/// Strictly larger than `MAX_DEPTH + 1` so walks over corrupted state
/// terminate instead of looping; intact graphs never get near it.
pub const WALK_CAP: usize = 100;
