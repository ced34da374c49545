//! Pivot pool and batch sampling.
//!
//! The pool tracks two disjoint id sets: `previous` (every pivot ever
//! used) and `current` (the batch active this cycle). Sampling moves the
//! current batch into `previous`, then draws unused ids uniformly at
//! random until the batch is full or every id has been consumed.
//!
//! Invariants:
//! - `current ∩ previous = ∅`
//! - `|previous| + |current|` never exceeds the vertex count and never
//!   decreases.

use hbse_core::types::VertexId;
use rand::Rng;
use std::collections::HashSet;

/// Once fewer than this fraction of ids remains unused, rejection
/// sampling degrades toward linear scans per draw; below it the sampler
/// materializes the unused ids and draws directly. Observable semantics
/// are unchanged (uniform over unused ids).
const REJECTION_CUTOVER_DENOMINATOR: usize = 4;

/// Tracks used and active pivot ids across a run.
#[derive(Debug, Clone)]
pub struct PivotPool {
    vertex_count: usize,
    previous: HashSet<VertexId>,
    current: Vec<VertexId>,
}

impl PivotPool {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            previous: HashSet::new(),
            current: Vec::new(),
        }
    }

    /// Installs a manually supplied first batch. Ids are assumed validated
    /// (in range, no duplicates) by configuration loading.
    pub fn seed_manual(&mut self, pivots: &[VertexId]) {
        self.current = pivots.to_vec();
    }

    /// The batch active this cycle, in selection order.
    pub fn current(&self) -> &[VertexId] {
        &self.current
    }

    /// Total pivots consumed so far (previous plus active).
    pub fn selected_count(&self) -> usize {
        self.previous.len() + self.current.len()
    }

    /// True once every vertex has been used as a pivot; sampling more is
    /// impossible and the run must terminate.
    pub fn exhausted(&self) -> bool {
        self.selected_count() == self.vertex_count
    }

    fn is_used(&self, id: VertexId) -> bool {
        self.previous.contains(&id) || self.current.contains(&id)
    }

    /// Retires the current batch and draws a new one of up to
    /// `batch_size` unused ids, uniformly at random.
    ///
    /// Returns the new batch (possibly shorter than requested near
    /// exhaustion — callers must not assume exact size). Always
    /// terminates: the unused pool strictly shrinks and the sampler
    /// switches to direct draws when rejection gets tight.
    pub fn choose<R: Rng>(&mut self, rng: &mut R, batch_size: usize) -> Vec<VertexId> {
        self.previous.extend(self.current.drain(..));

        let mut attempts: u64 = 0;
        while self.current.len() < batch_size && self.selected_count() < self.vertex_count {
            let unused = self.vertex_count - self.selected_count();
            if unused * REJECTION_CUTOVER_DENOMINATOR < self.vertex_count {
                self.fill_from_remaining(rng, batch_size);
                break;
            }
            attempts += 1;
            let pivot = rng.gen_range(0..self.vertex_count);
            if !self.is_used(pivot) {
                self.current.push(pivot);
            }
        }

        log::info!(
            "Pivot selection complete. Took {} attempts for {} pivots ({} of {} ids used).",
            attempts,
            self.current.len(),
            self.selected_count(),
            self.vertex_count
        );
        self.current.clone()
    }

    /// Direct draw from the materialized unused-id set.
    fn fill_from_remaining<R: Rng>(&mut self, rng: &mut R, batch_size: usize) {
        let mut remaining: Vec<VertexId> = (0..self.vertex_count)
            .filter(|&id| !self.is_used(id))
            .collect();
        while self.current.len() < batch_size && !remaining.is_empty() {
            let index = rng.gen_range(0..remaining.len());
            self.current.push(remaining.swap_remove(index));
        }
    }
}
