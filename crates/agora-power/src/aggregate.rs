//! Voting-power counting over a snapshot.

use crate::snapshot::GraphSnapshot;
use crate::Result;
use agora_types::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One terminal delegate and its aggregated power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerEntry {
    /// The terminal delegate holding the power.
    pub delegate: ParticipantId,
    /// Number of universe participants whose chain resolves here.
    pub power: u64,
}

/// Aggregate voting power for every terminal delegate.
///
/// Each participant in `all_voters` contributes exactly 1 to the terminal
/// its chain resolves to; a terminal present in the universe contributes to
/// its own count. Only terminals with power > 0 appear.
///
/// Output order is part of the public contract: power descending, ties
/// broken by ascending participant id.
///
/// Errors with [`PowerError::CycleDetected`](crate::PowerError::CycleDetected)
/// if any voter's chain walks into a cycle - the whole aggregation is
/// rejected rather than silently skipping the affected voters.
pub fn voting_power(
    snapshot: &GraphSnapshot,
    all_voters: &[ParticipantId],
) -> Result<Vec<PowerEntry>> {
    let mut counts: HashMap<ParticipantId, u64> = HashMap::new();
    for &voter in all_voters {
        let terminal = snapshot.terminal_delegate(voter)?;
        *counts.entry(terminal).or_insert(0) += 1;
    }

    let mut entries: Vec<PowerEntry> = counts
        .into_iter()
        .map(|(delegate, power)| PowerEntry { delegate, power })
        .collect();
    entries.sort_by(|a, b| b.power.cmp(&a.power).then(a.delegate.cmp(&b.delegate)));
    Ok(entries)
}

/// The canonical `(addresses, powers)` parallel arrays for hashing.
///
/// Ascending participant id, so independent operators over the same state
/// produce byte-identical arrays regardless of how they ordered their own
/// intermediate results.
pub fn canonical_result(entries: &[PowerEntry]) -> (Vec<ParticipantId>, Vec<u64>) {
    let mut sorted: Vec<PowerEntry> = entries.to_vec();
    sorted.sort_by(|a, b| a.delegate.cmp(&b.delegate));
    sorted.iter().map(|e| (e.delegate, e.power)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PowerError;
    use agora_types::TopicId;

    fn p(seed: u8) -> ParticipantId {
        ParticipantId::from_bytes([seed; 32])
    }

    #[test]
    fn two_delegators_one_terminal() {
        // alice -> charlie, bob -> charlie, universe {alice, bob, charlie}
        let (alice, bob, charlie) = (p(1), p(2), p(3));
        let snap = GraphSnapshot::from_edges(TopicId(1), [(alice, charlie), (bob, charlie)]);

        let result = voting_power(&snap, &[alice, bob, charlie]).unwrap();
        assert_eq!(
            result,
            vec![PowerEntry {
                delegate: charlie,
                power: 3
            }]
        );
    }

    #[test]
    fn multi_branch_sorted_descending() {
        // alice -> bob -> charlie, dave -> charlie, eve -> frank
        let (alice, bob, charlie, dave, eve, frank) = (p(1), p(2), p(3), p(4), p(5), p(6));
        let snap = GraphSnapshot::from_edges(
            TopicId(1),
            [(alice, bob), (bob, charlie), (dave, charlie), (eve, frank)],
        );

        let result = voting_power(&snap, &[alice, bob, charlie, dave, eve, frank]).unwrap();
        assert_eq!(
            result,
            vec![
                PowerEntry {
                    delegate: charlie,
                    power: 4
                },
                PowerEntry {
                    delegate: frank,
                    power: 2
                },
            ]
        );
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let snap = GraphSnapshot::from_edges(TopicId(1), [(p(9), p(2)), (p(8), p(5))]);
        let result = voting_power(&snap, &[p(9), p(8)]).unwrap();

        // Both terminals have power 1; lower id first.
        assert_eq!(result[0].delegate, p(2));
        assert_eq!(result[1].delegate, p(5));
    }

    #[test]
    fn voter_outside_any_chain_counts_itself() {
        let snap = GraphSnapshot::from_edges(TopicId(1), [(p(1), p(2))]);
        let result = voting_power(&snap, &[p(1), p(7)]).unwrap();

        assert!(result.contains(&PowerEntry {
            delegate: p(2),
            power: 1
        }));
        assert!(result.contains(&PowerEntry {
            delegate: p(7),
            power: 1
        }));
    }

    #[test]
    fn terminal_outside_universe_still_receives_power() {
        // The universe decides who *contributes*, not who may hold power.
        let snap = GraphSnapshot::from_edges(TopicId(1), [(p(1), p(2))]);
        let result = voting_power(&snap, &[p(1)]).unwrap();
        assert_eq!(
            result,
            vec![PowerEntry {
                delegate: p(2),
                power: 1
            }]
        );
    }

    #[test]
    fn empty_universe_empty_result() {
        let snap = GraphSnapshot::from_edges(TopicId(1), [(p(1), p(2))]);
        assert!(voting_power(&snap, &[]).unwrap().is_empty());
    }

    #[test]
    fn cycle_rejects_whole_aggregation() {
        let snap = GraphSnapshot::from_edges(TopicId(1), [(p(1), p(2)), (p(2), p(1))]);
        let err = voting_power(&snap, &[p(3), p(1)]).unwrap_err();
        assert!(matches!(err, PowerError::CycleDetected { .. }));
    }

    #[test]
    fn canonical_result_is_input_order_independent() {
        let entries_a = vec![
            PowerEntry {
                delegate: p(3),
                power: 4
            },
            PowerEntry {
                delegate: p(6),
                power: 2
            },
        ];
        let mut entries_b = entries_a.clone();
        entries_b.reverse();

        let (addrs_a, powers_a) = canonical_result(&entries_a);
        let (addrs_b, powers_b) = canonical_result(&entries_b);
        assert_eq!(addrs_a, addrs_b);
        assert_eq!(powers_a, powers_b);
        assert_eq!(addrs_a, vec![p(3), p(6)]);
        assert_eq!(powers_a, vec![4, 2]);
    }
}
