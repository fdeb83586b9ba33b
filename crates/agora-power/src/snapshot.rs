//! Immutable per-topic graph snapshots.

use crate::{PowerError, Result};
use agora_graph::{DelegationStore, WALK_CAP};
use agora_types::{ParticipantId, TopicId};
use std::collections::{HashMap, HashSet};

/// A frozen view of one topic's delegation edges.
///
/// Built either from the authoritative [`DelegationStore`] or from
/// externally supplied `(delegator, delegate)` pairs. Out-degree <= 1 holds
/// by construction (map keyed by delegator); acyclicity does not, which is
/// why every walk over a snapshot detects cycles instead of trusting them
/// away.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    topic: TopicId,
    edges: HashMap<ParticipantId, ParticipantId>,
}

impl GraphSnapshot {
    /// Build from raw `(delegator, delegate)` pairs.
    ///
    /// A repeated delegator keeps the last pair seen (matching the store's
    /// last-write-wins semantics).
    pub fn from_edges(
        topic: TopicId,
        pairs: impl IntoIterator<Item = (ParticipantId, ParticipantId)>,
    ) -> Self {
        Self {
            topic,
            edges: pairs.into_iter().collect(),
        }
    }

    /// Snapshot one topic out of the authoritative store.
    pub fn from_store(store: &DelegationStore, topic: TopicId) -> Self {
        Self {
            topic,
            edges: store
                .edges_for_topic(topic)
                .map(|e| (e.delegator, e.delegate))
                .collect(),
        }
    }

    /// The topic this snapshot covers.
    pub fn topic(&self) -> TopicId {
        self.topic
    }

    /// The delegate a participant points at, if any.
    pub fn delegate_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        self.edges.get(&participant).copied()
    }

    /// All participants with an outgoing edge.
    pub fn delegators(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.edges.keys().copied()
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if no edges exist.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Resolve the terminal delegate a participant's chain ends at.
    ///
    /// Returns the participant itself when it has no outgoing edge. Errors
    /// with [`PowerError::CycleDetected`] if the walk revisits any node; the
    /// iteration is additionally capped at [`WALK_CAP`].
    pub fn terminal_delegate(&self, participant: ParticipantId) -> Result<ParticipantId> {
        let mut visited = HashSet::new();
        let mut cursor = participant;
        let mut steps = 0usize;
        visited.insert(cursor);
        while let Some(next) = self.delegate_of(cursor) {
            if !visited.insert(next) {
                return Err(PowerError::CycleDetected { at: next });
            }
            cursor = next;
            steps += 1;
            if steps >= WALK_CAP {
                return Err(PowerError::CycleDetected { at: cursor });
            }
        }
        Ok(cursor)
    }

    /// Forward chain length from a participant, with the same cycle defense
    /// as [`terminal_delegate`](Self::terminal_delegate).
    pub fn depth(&self, participant: ParticipantId) -> Result<usize> {
        let mut visited = HashSet::new();
        let mut cursor = participant;
        let mut hops = 0usize;
        visited.insert(cursor);
        while let Some(next) = self.delegate_of(cursor) {
            if !visited.insert(next) {
                return Err(PowerError::CycleDetected { at: next });
            }
            cursor = next;
            hops += 1;
            if hops >= WALK_CAP {
                return Err(PowerError::CycleDetected { at: cursor });
            }
        }
        Ok(hops)
    }
}
