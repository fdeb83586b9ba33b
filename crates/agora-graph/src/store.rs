//! Delegation state storage.

use agora_types::{ParticipantId, TopicId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A directed delegation edge for one topic.
///
/// At most one edge exists per `(delegator, topic)`; writing a new one
/// replaces the old (last-write-wins, no history retained).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationEdge {
    /// The participant delegating their vote.
    pub delegator: ParticipantId,
    /// The participant receiving the delegation.
    pub delegate: ParticipantId,
    /// The topic this edge is scoped to.
    pub topic: TopicId,
    /// Unix timestamp in milliseconds when the edge was written.
    pub timestamp_ms: u64,
}

/// Dead-end declaration state for one `(participant, topic)`.
///
/// A declared dead end refuses *new* incoming delegations; existing edges
/// pointing at the participant are unaffected, and the participant may still
/// delegate outward. Revoking keeps the last declaration timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeadEndFlag {
    /// Whether the flag is currently set.
    pub declared: bool,
    /// Unix timestamp in milliseconds of the most recent declaration.
    pub declared_at_ms: u64,
}

/// Pure delegation state: per-topic edges and dead-end flags.
///
/// Keyed by `(topic, participant)` so each participant has at most one
/// outgoing edge per topic by construction. Mutated only through
/// [`DelegationGraphEngine`](crate::DelegationGraphEngine), which validates
/// every structural invariant before touching this store.
#[derive(Debug, Default, Clone)]
pub struct DelegationStore {
    edges: HashMap<(TopicId, ParticipantId), DelegationEdge>,
    dead_ends: HashMap<(TopicId, ParticipantId), DeadEndFlag>,
}

impl DelegationStore {
    /// Create empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the outgoing edge for a participant, if any.
    pub fn edge(&self, topic: TopicId, delegator: ParticipantId) -> Option<&DelegationEdge> {
        self.edges.get(&(topic, delegator))
    }

    /// Get just the delegate a participant points at, if any.
    pub fn delegate_of(&self, topic: TopicId, delegator: ParticipantId) -> Option<ParticipantId> {
        self.edges.get(&(topic, delegator)).map(|e| e.delegate)
    }

    /// All edges for a topic, in unspecified order.
    pub fn edges_for_topic(&self, topic: TopicId) -> impl Iterator<Item = &DelegationEdge> {
        self.edges
            .iter()
            .filter(move |((t, _), _)| *t == topic)
            .map(|(_, e)| e)
    }

    /// The dead-end flag for a participant, if ever declared.
    pub fn dead_end(&self, topic: TopicId, participant: ParticipantId) -> Option<&DeadEndFlag> {
        self.dead_ends.get(&(topic, participant))
    }

    /// Whether the flag is currently set.
    pub fn is_dead_end(&self, topic: TopicId, participant: ParticipantId) -> bool {
        self.dead_ends
            .get(&(topic, participant))
            .map(|f| f.declared)
            .unwrap_or(false)
    }

    /// Number of edges across all topics.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if no edges exist.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    // Crate-private mutators. Invariant checks happen in the engine; these
    // only apply an already-validated write.

    pub(crate) fn put_edge(&mut self, edge: DelegationEdge) -> Option<DelegationEdge> {
        self.edges.insert((edge.topic, edge.delegator), edge)
    }

    pub(crate) fn remove_edge(
        &mut self,
        topic: TopicId,
        delegator: ParticipantId,
    ) -> Option<DelegationEdge> {
        self.edges.remove(&(topic, delegator))
    }

    pub(crate) fn set_dead_end(
        &mut self,
        topic: TopicId,
        participant: ParticipantId,
        declared: bool,
        now_ms: u64,
    ) {
        let entry = self.dead_ends.entry((topic, participant)).or_default();
        if declared {
            entry.declared = true;
            entry.declared_at_ms = now_ms;
        } else {
            entry.declared = false;
        }
    }
}
