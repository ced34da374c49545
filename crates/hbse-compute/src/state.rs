//! Per-vertex state for the HBSE computation.

use hbse_core::types::VertexId;
use std::collections::HashMap;

/// Shortest-path and dependency bookkeeping for one (vertex, source) pair.
///
/// `predecessors` maps each predecessor on a shortest path from the source
/// to the number of shortest paths flowing through it; the vertex's own
/// path count is the sum (or 1 for the source itself).
#[derive(Debug, Clone, Default)]
pub struct PathData {
    /// Distance from the source along shortest paths
    pub distance: u64,

    /// Predecessor -> shortest-path count through that predecessor
    pub predecessors: HashMap<VertexId, u64>,

    /// Successor count, learned in the find-successors round
    pub num_successors: usize,

    /// Accumulated pair dependency for this source
    pub dependency: f64,

    /// Dependency shares received so far
    pub deps_received: usize,

    /// Whether this vertex already forwarded its dependency upstream
    pub forwarded: bool,
}

impl PathData {
    /// Bookkeeping for a pivot source: distance zero, one path, no
    /// predecessors.
    pub fn source() -> Self {
        Self::default()
    }

    /// Number of shortest paths from the source reaching this vertex.
    pub fn num_paths(&self, vertex: VertexId, source: VertexId) -> u64 {
        if vertex == source {
            1
        } else {
            self.predecessors.values().sum()
        }
    }
}

/// Full per-vertex state: one [`PathData`] per active source, plus the
/// running approximate-betweenness accumulator.
#[derive(Debug, Clone, Default)]
pub struct VertexState {
    /// Source -> shortest-path bookkeeping, covering every pivot batch of
    /// the current cycle
    pub path_data: HashMap<VertexId, PathData>,

    /// Approximate betweenness accumulated across all completed cycles
    pub approx_betweenness: f64,

    /// Set when a cycle's dependencies have been folded; the next
    /// shortest-path start clears per-source state so each cycle
    /// contributes exactly once
    pub cycle_folded: bool,
}
