//! Error types for agora-graph.

use agora_types::{ParticipantId, TopicId};
use thiserror::Error;

/// Result type for delegation graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Rejections raised by the delegation graph engine.
///
/// Every rejection is a distinct variant so callers pattern-match on the
/// kind rather than inspecting messages. No variant leaves partial state
/// behind: a rejected operation mutated nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A participant tried to delegate to themselves.
    #[error("self-delegation is not allowed")]
    SelfDelegation,

    /// The topic is not in an active state.
    #[error("{topic} is not active")]
    TopicInactive { topic: TopicId },

    /// The target has declared itself a dead end for this topic.
    #[error("delegate {delegate} has declared a dead end")]
    DelegateIsDeadEnd { delegate: ParticipantId },

    /// The new edge would close a delegation cycle.
    #[error("delegating via {via} would create a cycle")]
    CycleDetected { via: ParticipantId },

    /// The new edge would make the chain longer than the depth bound.
    #[error("delegation chain depth {depth} exceeds maximum {max}")]
    ExceedsMaxDepth { depth: u8, max: u8 },
}
