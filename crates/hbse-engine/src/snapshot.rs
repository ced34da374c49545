//! Round-snapshot construction at the barrier.
//!
//! Each round ends by building one immutable [`RoundSnapshot`] from three
//! inputs, in order:
//! 1. persistent keys carried from the previous snapshot (phase, pivots),
//! 2. the round's worker contributions, merged under the declared
//!    reductions (sum, bounded top-K),
//! 3. the master's writes, which overwrite.
//!
//! Contributions are merged in partition order, so a run is deterministic
//! for a fixed partition count.

use hbse_core::aggregate::{AggKey, AggValue, RoundSnapshot};
use hbse_core::types::{ScoredSet, VertexId};
use std::collections::HashMap;

/// Accumulates one round's worker contributions on top of the carried
/// persistent values.
#[derive(Debug)]
pub struct SnapshotBuilder {
    values: HashMap<AggKey, AggValue>,
}

impl SnapshotBuilder {
    /// Starts a builder carrying the previous round's persistent keys.
    pub fn carrying(previous: &RoundSnapshot) -> Self {
        let mut values = HashMap::new();
        for key in [AggKey::State, AggKey::PivotBatch] {
            debug_assert!(key.is_persistent());
            if let Some(value) = previous.get(key) {
                values.insert(key, value.clone());
            }
        }
        values.insert(AggKey::UpdateCount, AggValue::Count(0));
        Self { values }
    }

    /// Merges one partition's contribution (called in partition order).
    pub fn add_contribution(&mut self, updates: i64, scores: Option<ScoredSet>) {
        if updates != 0 {
            if let Some(value) = self.values.get_mut(&AggKey::UpdateCount) {
                value.reduce(&AggValue::Count(updates));
            }
        }
        if let Some(scores) = scores {
            match self.values.get_mut(&AggKey::HighBcSet) {
                Some(value) => value.reduce(&AggValue::Scores(scores)),
                None => {
                    self.values.insert(AggKey::HighBcSet, AggValue::Scores(scores));
                }
            }
        }
    }

    /// Freezes the merged view the master callback reads.
    pub fn build(self) -> RoundSnapshot {
        RoundSnapshot::new(self.values)
    }
}

/// Applies the master's writes on top of the merged view, producing the
/// snapshot the next round's vertices observe.
pub fn apply_master_writes(
    merged: RoundSnapshot,
    phase: Option<i64>,
    pivots: Option<Vec<VertexId>>,
) -> RoundSnapshot {
    let mut values = HashMap::new();
    for key in [
        AggKey::State,
        AggKey::PivotBatch,
        AggKey::UpdateCount,
        AggKey::HighBcSet,
    ] {
        if let Some(value) = merged.get(key) {
            values.insert(key, value.clone());
        }
    }
    if let Some(ordinal) = phase {
        values.insert(AggKey::State, AggValue::Count(ordinal));
    }
    if let Some(pivots) = pivots {
        values.insert(AggKey::PivotBatch, AggValue::Pivots(pivots));
    }
    RoundSnapshot::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_counts_sum_across_partitions() {
        let mut builder = SnapshotBuilder::carrying(&RoundSnapshot::default());
        builder.add_contribution(3, None);
        builder.add_contribution(0, None);
        builder.add_contribution(4, None);
        assert_eq!(builder.build().update_count(), 7);
    }

    #[test]
    fn persistent_keys_carry_and_volatile_keys_reset() {
        let published = apply_master_writes(RoundSnapshot::default(), Some(2), Some(vec![5, 6]));

        // A quiet round: no contributions, no master writes.
        let builder = SnapshotBuilder::carrying(&published);
        let merged = builder.build();
        assert_eq!(merged.phase_ordinal(), Some(2));
        assert_eq!(merged.pivots(), &[5, 6]);
        assert_eq!(merged.update_count(), 0);
        assert!(merged.high_bc_set().is_none());
    }

    #[test]
    fn master_writes_overwrite() {
        let first = apply_master_writes(RoundSnapshot::default(), Some(1), Some(vec![1]));
        let merged = SnapshotBuilder::carrying(&first).build();
        let second = apply_master_writes(merged, Some(2), None);

        assert_eq!(second.phase_ordinal(), Some(2));
        assert_eq!(second.pivots(), &[1]);
    }

    #[test]
    fn score_contributions_merge_bounded() {
        let mut builder = SnapshotBuilder::carrying(&RoundSnapshot::default());
        let mut a = ScoredSet::new(2);
        a.insert(1, 9.0);
        a.insert(2, 1.0);
        let mut b = ScoredSet::new(2);
        b.insert(3, 5.0);
        builder.add_contribution(0, Some(a));
        builder.add_contribution(0, Some(b));

        let merged = builder.build();
        let set = merged.high_bc_set().expect("scores contributed");
        assert_eq!(set.ids(), vec![1, 3]);
    }
}
