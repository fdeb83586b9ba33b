//! Diagnostic validation of externally supplied snapshots.
//!
//! The off-chain computation unit may be handed graph data that never passed
//! through the authoritative engine. [`validate`] runs the structural checks
//! the engine would have enforced and reports every violation found, so a
//! snapshot can be rejected *before* its aggregation output is trusted.

use crate::snapshot::GraphSnapshot;
use agora_graph::MAX_DEPTH;
use agora_types::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// One structural violation found in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GraphViolation {
    /// A forward cycle; `members` lists the participants on it.
    #[error("cycle of {} participants: {}", .members.len(), display_ids(.members))]
    CycleDetected { members: Vec<ParticipantId> },

    /// A chain longer than the depth bound.
    #[error("chain from {participant} has depth {depth}, exceeding {}", MAX_DEPTH)]
    MaxDepthExceeded { participant: ParticipantId, depth: usize },
}

fn display_ids(ids: &[ParticipantId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// The outcome of validating a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphReport {
    /// True when no violations were found.
    pub valid: bool,
    /// Every violation, in deterministic order.
    pub errors: Vec<GraphViolation>,
}

/// Enumerate all forward cycles in a snapshot.
///
/// Exploits the functional-graph structure: one walk per unvisited node with
/// an in-progress marking, O(n) total. Each cycle is reported once, members
/// in walk order starting from its smallest entry point encountered;
/// starting nodes are processed in ascending id order so the output is
/// deterministic.
pub fn detect_cycles(snapshot: &GraphSnapshot) -> Vec<Vec<ParticipantId>> {
    // 1 = on the current walk, 2 = fully processed.
    let mut mark: HashMap<ParticipantId, u8> = HashMap::new();
    let mut cycles = Vec::new();

    let mut starts: Vec<ParticipantId> = snapshot.delegators().collect();
    starts.sort();

    for start in starts {
        if mark.contains_key(&start) {
            continue;
        }
        let mut path = Vec::new();
        let mut cursor = start;
        loop {
            match mark.get(&cursor) {
                // Revisiting the current walk: everything from the first
                // occurrence onward is the cycle.
                Some(1) => {
                    let pos = path.iter().position(|&n| n == cursor).unwrap();
                    cycles.push(path[pos..].to_vec());
                    break;
                }
                // Reaches a previously processed region; any cycle there was
                // already reported.
                Some(_) => break,
                None => {
                    mark.insert(cursor, 1);
                    path.push(cursor);
                    match snapshot.delegate_of(cursor) {
                        Some(next) => cursor = next,
                        None => break,
                    }
                }
            }
        }
        for node in path {
            mark.insert(node, 2);
        }
    }

    cycles
}

/// Validate a snapshot, reporting cycles and over-deep chains.
pub fn validate(snapshot: &GraphSnapshot) -> GraphReport {
    let mut errors: Vec<GraphViolation> = detect_cycles(snapshot)
        .into_iter()
        .map(|members| GraphViolation::CycleDetected { members })
        .collect();

    let mut starts: Vec<ParticipantId> = snapshot.delegators().collect();
    starts.sort();
    for participant in starts {
        // Chains that run into a cycle are already covered above.
        if let Ok(depth) = snapshot.depth(participant) {
            if depth > MAX_DEPTH as usize {
                errors.push(GraphViolation::MaxDepthExceeded { participant, depth });
            }
        }
    }

    GraphReport {
        valid: errors.is_empty(),
        errors,
    }
}
