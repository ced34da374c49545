//! Engine-facing traits: the seams between the superstep runtime, the
//! per-vertex computation, and the master coordinator.
//!
//! The runtime owns the loop; implementations only see one round at a
//! time. Vertex programs communicate exclusively through messages and the
//! aggregation channel — never by mutating shared state — and the master
//! callback runs exactly once per round, after the barrier.

use crate::aggregate::RoundSnapshot;
use crate::errors::Result;
use crate::types::{Graph, ScoredSet, VertexId};

/// Per-round output collector for one vertex computation.
///
/// Messages are delivered to their targets at the start of the next round;
/// aggregate contributions are merged at this round's barrier.
#[derive(Debug)]
pub struct Outbox<M> {
    messages: Vec<(VertexId, M)>,
    update_count: i64,
    scores: Option<ScoredSet>,
}

impl<M> Outbox<M> {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            update_count: 0,
            scores: None,
        }
    }

    /// Queues a message for delivery next round.
    pub fn send(&mut self, to: VertexId, message: M) {
        self.messages.push((to, message));
    }

    /// Adds to this round's global update count.
    pub fn count_updates(&mut self, updates: i64) {
        self.update_count += updates;
    }

    /// Contributes a scored candidate to the high-betweenness reduction.
    pub fn contribute_score(&mut self, id: VertexId, score: f64, max_size: usize) {
        self.scores
            .get_or_insert_with(|| ScoredSet::new(max_size))
            .insert(id, score);
    }

    /// Consumes the outbox into its parts (runtime use).
    pub fn into_parts(self) -> (Vec<(VertexId, M)>, i64, Option<ScoredSet>) {
        (self.messages, self.update_count, self.scores)
    }
}

impl<M> Default for Outbox<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// A per-vertex computation, executed once per vertex per round.
///
/// Implementations must be pure with respect to shared state: everything a
/// vertex learns comes from its own state, its inbox, and the previous
/// round's snapshot; everything it says goes through the outbox.
pub trait VertexProgram: Send + Sync {
    /// Message type exchanged between vertices.
    type Message: Clone + Send + Sync;

    /// Per-vertex state, owned by the runtime.
    type State: Default + Send;

    /// Runs one vertex for one round.
    fn compute(
        &self,
        vertex: VertexId,
        graph: &Graph,
        state: &mut Self::State,
        inbox: &[Self::Message],
        snapshot: &RoundSnapshot,
        outbox: &mut Outbox<Self::Message>,
    ) -> Result<()>;
}

/// The master coordinator's per-round view of the aggregation channel.
///
/// Reads see this round's merged worker contributions (plus carried-over
/// persistent values); writes land in the snapshot the next round's
/// vertices observe.
#[derive(Debug)]
pub struct MasterContext<'a> {
    round: u64,
    merged: &'a RoundSnapshot,
    state_write: Option<i64>,
    pivot_write: Option<Vec<VertexId>>,
    halt: bool,
}

impl<'a> MasterContext<'a> {
    pub fn new(round: u64, merged: &'a RoundSnapshot) -> Self {
        Self {
            round,
            merged,
            state_write: None,
            pivot_write: None,
            halt: false,
        }
    }

    /// The current round (superstep) number.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Update count aggregated from this round's vertex computations.
    pub fn update_count(&self) -> i64 {
        self.merged.update_count()
    }

    /// Merged high-betweenness candidates from this round, if any.
    pub fn high_bc_set(&self) -> Option<&ScoredSet> {
        self.merged.high_bc_set()
    }

    /// Publishes the phase ordinal for the next round.
    pub fn publish_phase(&mut self, ordinal: i64) {
        self.state_write = Some(ordinal);
    }

    /// Publishes the pivot batch for the next round.
    pub fn publish_pivots(&mut self, pivots: Vec<VertexId>) {
        self.pivot_write = Some(pivots);
    }

    /// Signals the global halt; the runtime stops after this round.
    pub fn halt(&mut self) {
        self.halt = true;
    }

    /// Consumes the context into its writes (runtime use).
    pub fn into_writes(self) -> (Option<i64>, Option<Vec<VertexId>>, bool) {
        (self.state_write, self.pivot_write, self.halt)
    }
}

/// The master coordinator callback, invoked once per round after the
/// barrier. Runs single-threaded; all coordinator state lives behind it.
pub trait MasterCompute {
    fn compute(&mut self, ctx: &mut MasterContext<'_>) -> Result<()>;
}
