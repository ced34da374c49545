//! The aggregation channel: the round-scoped global values shared between
//! the master coordinator and the per-vertex computation.
//!
//! Rather than a shared mutable registry, each round produces a new
//! immutable [`RoundSnapshot`] consumed by the next round. Worker
//! contributions are merged at the barrier under a reduction declared per
//! key; master writes overwrite. This preserves the "publish once, read
//! many" semantics without shared mutable globals.

use crate::types::{ScoredSet, VertexId};
use std::collections::HashMap;

/// Keys of the aggregation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggKey {
    /// Current phase ordinal. Master-overwrite, persistent across rounds.
    State,
    /// Current pivot batch. Master-overwrite, persistent across rounds.
    PivotBatch,
    /// Sum of per-vertex state changes this round. Reset each round.
    UpdateCount,
    /// Merged top-K high-betweenness candidates. Reset each round.
    HighBcSet,
}

impl AggKey {
    pub fn as_str(self) -> &'static str {
        match self {
            AggKey::State => "STATE",
            AggKey::PivotBatch => "PIVOT_BATCH",
            AggKey::UpdateCount => "UPDATE_COUNT",
            AggKey::HighBcSet => "HIGH_BC_SET",
        }
    }

    /// Whether the key's value carries over to the next round when nobody
    /// writes it (master-owned keys), or is rebuilt from scratch by the
    /// round's worker reduction.
    pub fn is_persistent(self) -> bool {
        matches!(self, AggKey::State | AggKey::PivotBatch)
    }
}

/// A value in the aggregation channel.
#[derive(Debug, Clone)]
pub enum AggValue {
    Count(i64),
    Pivots(Vec<VertexId>),
    Scores(ScoredSet),
}

impl AggValue {
    /// Applies the declared worker reduction for two contributions of the
    /// same key: integer sum for counts, bounded top-K merge for scores.
    ///
    /// Pivot batches have no worker reduction (only the master writes
    /// them); merging two is a contract violation.
    pub fn reduce(&mut self, other: &AggValue) {
        match (self, other) {
            (AggValue::Count(a), AggValue::Count(b)) => *a += *b,
            (AggValue::Scores(a), AggValue::Scores(b)) => a.merge(b),
            (a, b) => {
                unreachable!(
                    "mismatched aggregation reduction: {:?} with {:?}",
                    a, b
                )
            }
        }
    }
}

/// Immutable per-round view of the aggregation channel.
///
/// Built once at the barrier from the previous snapshot's persistent keys,
/// the round's merged worker contributions, and the master's writes.
#[derive(Debug, Clone, Default)]
pub struct RoundSnapshot {
    values: HashMap<AggKey, AggValue>,
}

impl RoundSnapshot {
    pub fn new(values: HashMap<AggKey, AggValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: AggKey) -> Option<&AggValue> {
        self.values.get(&key)
    }

    /// Published phase ordinal, if the master has published one yet.
    pub fn phase_ordinal(&self) -> Option<i64> {
        match self.values.get(&AggKey::State) {
            Some(AggValue::Count(ordinal)) => Some(*ordinal),
            _ => None,
        }
    }

    /// Current pivot batch, empty until the master publishes one.
    pub fn pivots(&self) -> &[VertexId] {
        match self.values.get(&AggKey::PivotBatch) {
            Some(AggValue::Pivots(pivots)) => pivots,
            _ => &[],
        }
    }

    /// Update count contributed by the round's vertex computations.
    pub fn update_count(&self) -> i64 {
        match self.values.get(&AggKey::UpdateCount) {
            Some(AggValue::Count(count)) => *count,
            _ => 0,
        }
    }

    /// Merged high-betweenness candidates, if any were contributed.
    pub fn high_bc_set(&self) -> Option<&ScoredSet> {
        match self.values.get(&AggKey::HighBcSet) {
            Some(AggValue::Scores(set)) => Some(set),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_reduction_sums() {
        let mut a = AggValue::Count(3);
        a.reduce(&AggValue::Count(4));
        match a {
            AggValue::Count(v) => assert_eq!(v, 7),
            _ => panic!("expected count"),
        }
    }

    #[test]
    fn scores_reduction_merges_bounded() {
        let mut left = ScoredSet::new(2);
        left.insert(0, 10.0);
        left.insert(1, 1.0);
        let mut right = ScoredSet::new(2);
        right.insert(2, 5.0);

        let mut a = AggValue::Scores(left);
        a.reduce(&AggValue::Scores(right));
        match a {
            AggValue::Scores(set) => {
                assert_eq!(set.ids(), vec![0, 2]);
            }
            _ => panic!("expected scores"),
        }
    }

    #[test]
    fn empty_snapshot_defaults() {
        let snapshot = RoundSnapshot::default();
        assert_eq!(snapshot.phase_ordinal(), None);
        assert!(snapshot.pivots().is_empty());
        assert_eq!(snapshot.update_count(), 0);
        assert!(snapshot.high_bc_set().is_none());
    }
}
