//! Computation phases shared between the master coordinator and the
//! per-vertex computation.
//!
//! The phase is published once per round through the `STATE` aggregation
//! key as a plain ordinal, so the enum <-> ordinal mapping here is part of
//! the wire contract. An ordinal that does not map back to a variant means
//! the published value was corrupted; that is fatal, never a fallthrough.

use crate::errors::{HbseError, Result};

/// State of the master coordination state machine.
///
/// A cycle is one pivot batch's full contribution: a shortest-path phase
/// (possibly repeated) followed by one pair-dependency phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Initial state; selects the first pivot batch.
    Start,
    /// Pivots seed themselves and announce distance zero.
    ShortestPathStart,
    /// Iterative shortest-path relaxation, until zero updates in a round.
    ShortestPathRun,
    /// Vertices on shortest paths ping their predecessors.
    PairDependencyPingPredecessor,
    /// Predecessors record their successors; leaves start accumulating.
    PairDependencyFindSuccessors,
    /// Iterative dependency accumulation, until zero updates in a round.
    PairDependencyRun,
    /// Cycle bookkeeping: merge the high-betweenness set, check stability.
    PairDependencyComplete,
    /// Terminal state: halt, persist results and stats.
    Finished,
}

impl Phase {
    /// Stable wire ordinal for publication through the aggregation channel.
    pub fn ordinal(self) -> i64 {
        match self {
            Phase::Start => 0,
            Phase::ShortestPathStart => 1,
            Phase::ShortestPathRun => 2,
            Phase::PairDependencyPingPredecessor => 3,
            Phase::PairDependencyFindSuccessors => 4,
            Phase::PairDependencyRun => 5,
            Phase::PairDependencyComplete => 6,
            Phase::Finished => 7,
        }
    }

    /// Decodes a published ordinal.
    ///
    /// An out-of-range ordinal signals a corrupted or externally tampered
    /// phase value; the run must abort rather than continue.
    pub fn from_ordinal(ordinal: i64) -> Result<Phase> {
        match ordinal {
            0 => Ok(Phase::Start),
            1 => Ok(Phase::ShortestPathStart),
            2 => Ok(Phase::ShortestPathRun),
            3 => Ok(Phase::PairDependencyPingPredecessor),
            4 => Ok(Phase::PairDependencyFindSuccessors),
            5 => Ok(Phase::PairDependencyRun),
            6 => Ok(Phase::PairDependencyComplete),
            7 => Ok(Phase::Finished),
            other => Err(HbseError::state(format!(
                "unknown phase ordinal {} published through the aggregation channel",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Start => "START",
            Phase::ShortestPathStart => "SHORTEST_PATH_START",
            Phase::ShortestPathRun => "SHORTEST_PATH_RUN",
            Phase::PairDependencyPingPredecessor => "PAIR_DEPENDENCY_PING_PREDECESSOR",
            Phase::PairDependencyFindSuccessors => "PAIR_DEPENDENCY_FIND_SUCCESSORS",
            Phase::PairDependencyRun => "PAIR_DEPENDENCY_RUN",
            Phase::PairDependencyComplete => "PAIR_DEPENDENCY_COMPLETE",
            Phase::Finished => "FINISHED",
        };
        f.write_str(name)
    }
}
