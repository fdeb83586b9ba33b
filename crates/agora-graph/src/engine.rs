//! Invariant-preserving delegation mutation and chain traversal.
//!
//! All writes to the [`DelegationStore`] go through
//! [`DelegationGraphEngine`]. Each operation validates every precondition
//! before touching state, so a rejected call mutates nothing.
//!
//! # Depth guarantee
//!
//! The depth check on [`delegate`](DelegationGraphEngine::delegate) bounds
//! the chain *through the new edge only*: `depth(delegate) + 1` must not
//! exceed [`MAX_DEPTH`]. Chains that already feed into the delegator are not
//! re-validated, so a terminal extending its own chain can push upstream
//! participants past the bound. This forward-only guarantee is deliberate
//! (it matches the authoritative semantics); the stricter alternative would
//! recompute the maximum depth across all incoming chains.

use crate::error::{GraphError, Result};
use crate::store::{DelegationEdge, DelegationStore};
use crate::{MAX_DEPTH, WALK_CAP};
use agora_types::{ParticipantId, TopicId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// External topic-registry boundary.
///
/// Topic lifecycle (creation, activation, archival) belongs to a
/// collaborator; the engine only asks whether a topic currently accepts
/// delegation writes.
pub trait TopicDirectory {
    /// Whether the topic is in an active state.
    fn is_active(&self, topic: TopicId) -> bool;
}

/// A fixed set of active topics. Useful for tests and single-process setups.
#[derive(Debug, Default, Clone)]
pub struct StaticTopics {
    active: HashSet<TopicId>,
}

impl StaticTopics {
    /// Create with the given active topics.
    pub fn new(active: impl IntoIterator<Item = TopicId>) -> Self {
        Self {
            active: active.into_iter().collect(),
        }
    }

    /// Mark a topic active.
    pub fn activate(&mut self, topic: TopicId) {
        self.active.insert(topic);
    }

    /// Mark a topic inactive.
    pub fn deactivate(&mut self, topic: TopicId) {
        self.active.remove(&topic);
    }
}

impl TopicDirectory for StaticTopics {
    fn is_active(&self, topic: TopicId) -> bool {
        self.active.contains(&topic)
    }
}

/// A participant's current delegation, as served to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationInfo {
    /// Who the participant delegates to.
    pub delegate: ParticipantId,
    /// Forward chain length from the participant to its terminal.
    pub depth: u8,
    /// When the edge was written (unix millis).
    pub timestamp_ms: u64,
}

/// The delegation graph engine: owns the store and every structural
/// invariant on it.
#[derive(Debug, Default, Clone)]
pub struct DelegationGraphEngine<D> {
    store: DelegationStore,
    topics: D,
}

impl<D: TopicDirectory> DelegationGraphEngine<D> {
    /// Create an engine over an empty store.
    pub fn new(topics: D) -> Self {
        Self {
            store: DelegationStore::new(),
            topics,
        }
    }

    /// Read access to the underlying state (for snapshotting).
    pub fn store(&self) -> &DelegationStore {
        &self.store
    }

    /// Delegate `delegator`'s vote to `delegate` for a topic.
    ///
    /// Overwrites any existing edge from `delegator` on success
    /// (last-write-wins, no history). Fails fast with no state change on any
    /// violated precondition; see [`GraphError`] for the rejection kinds and
    /// the module docs for the forward-only depth guarantee.
    pub fn delegate(
        &mut self,
        delegator: ParticipantId,
        delegate: ParticipantId,
        topic: TopicId,
        now_ms: u64,
    ) -> Result<()> {
        if delegate == delegator {
            return Err(GraphError::SelfDelegation);
        }
        if !self.topics.is_active(topic) {
            return Err(GraphError::TopicInactive { topic });
        }
        if self.store.is_dead_end(topic, delegate) {
            return Err(GraphError::DelegateIsDeadEnd { delegate });
        }

        // Cycle check: out-degree <= 1, so one forward walk from the target
        // visits everything reachable through the new edge.
        let mut cursor = delegate;
        let mut steps = 0;
        while let Some(next) = self.store.delegate_of(topic, cursor) {
            if next == delegator {
                return Err(GraphError::CycleDetected { via: delegate });
            }
            cursor = next;
            steps += 1;
            if steps >= WALK_CAP {
                warn!(%topic, "cycle walk hit iteration cap; store state suspect");
                break;
            }
        }

        let depth = self.depth(delegate, topic);
        if depth + 1 > MAX_DEPTH {
            return Err(GraphError::ExceedsMaxDepth {
                depth: depth + 1,
                max: MAX_DEPTH,
            });
        }

        self.store.put_edge(DelegationEdge {
            delegator,
            delegate,
            topic,
            timestamp_ms: now_ms,
        });
        debug!(%topic, %delegator, %delegate, "delegation recorded");
        Ok(())
    }

    /// Remove `delegator`'s edge for a topic, if present.
    ///
    /// Idempotent: revoking an absent delegation is a no-op, never an error.
    /// Returns whether an edge was removed.
    pub fn revoke(&mut self, delegator: ParticipantId, topic: TopicId) -> bool {
        let removed = self.store.remove_edge(topic, delegator).is_some();
        if removed {
            debug!(%topic, %delegator, "delegation revoked");
        }
        removed
    }

    /// Declare the participant a dead end for a topic: no *new* incoming
    /// delegations will be accepted. Existing incoming edges are unaffected
    /// and the participant may still delegate outward.
    pub fn declare_dead_end(&mut self, participant: ParticipantId, topic: TopicId, now_ms: u64) {
        self.store.set_dead_end(topic, participant, true, now_ms);
        debug!(%topic, %participant, "dead end declared");
    }

    /// Clear a dead-end declaration.
    pub fn revoke_dead_end(&mut self, participant: ParticipantId, topic: TopicId) {
        self.store.set_dead_end(topic, participant, false, 0);
        debug!(%topic, %participant, "dead end revoked");
    }

    /// Forward chain length from a participant to its terminal, clamped to
    /// `0..=MAX_DEPTH`.
    ///
    /// 0 when the participant has no outgoing edge. The walk is capped at
    /// [`WALK_CAP`] iterations as a guard against corrupted state, and the
    /// returned value is clamped to [`MAX_DEPTH`] so the published range
    /// holds even over chains that escaped the bound (possible at the tail
    /// under the forward-only guarantee, see module docs).
    /// [`delegation_chain`](Self::delegation_chain) reports the full walk.
    pub fn depth(&self, participant: ParticipantId, topic: TopicId) -> u8 {
        let mut cursor = participant;
        let mut hops = 0usize;
        while let Some(next) = self.store.delegate_of(topic, cursor) {
            cursor = next;
            hops += 1;
            if hops >= WALK_CAP {
                warn!(%topic, %participant, "depth walk hit iteration cap; store state suspect");
                break;
            }
        }
        hops.min(MAX_DEPTH as usize) as u8
    }

    /// The terminal delegate a participant's chain resolves to.
    ///
    /// Returns the participant itself when it has no outgoing edge.
    pub fn terminal_delegate(&self, participant: ParticipantId, topic: TopicId) -> ParticipantId {
        let mut cursor = participant;
        let mut hops = 0usize;
        while let Some(next) = self.store.delegate_of(topic, cursor) {
            cursor = next;
            hops += 1;
            if hops >= WALK_CAP {
                warn!(%topic, %participant, "terminal walk hit iteration cap; store state suspect");
                break;
            }
        }
        cursor
    }

    /// The full chain `[participant, .., terminal]`, length `depth + 1`.
    pub fn delegation_chain(
        &self,
        participant: ParticipantId,
        topic: TopicId,
    ) -> Vec<ParticipantId> {
        let mut chain = vec![participant];
        let mut cursor = participant;
        while let Some(next) = self.store.delegate_of(topic, cursor) {
            chain.push(next);
            cursor = next;
            if chain.len() > WALK_CAP {
                warn!(%topic, %participant, "chain walk hit iteration cap; store state suspect");
                break;
            }
        }
        chain
    }

    /// A participant's current delegation with its depth and timestamp.
    pub fn delegation(
        &self,
        participant: ParticipantId,
        topic: TopicId,
    ) -> Option<DelegationInfo> {
        self.store.edge(topic, participant).map(|e| DelegationInfo {
            delegate: e.delegate,
            depth: self.depth(participant, topic),
            timestamp_ms: e.timestamp_ms,
        })
    }

    /// All `(delegator, delegate)` pairs for a topic.
    pub fn all_delegations_for_topic(&self, topic: TopicId) -> Vec<(ParticipantId, ParticipantId)> {
        self.store
            .edges_for_topic(topic)
            .map(|e| (e.delegator, e.delegate))
            .collect()
    }

    /// Dead-end status and last declaration time for a participant.
    pub fn is_dead_end(&self, participant: ParticipantId, topic: TopicId) -> (bool, u64) {
        self.store
            .dead_end(topic, participant)
            .map(|f| (f.declared, f.declared_at_ms))
            .unwrap_or((false, 0))
    }
}
