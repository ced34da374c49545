//! Core data types for the HBSE computation.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Vertex identifier. Valid ids for a run are the contiguous range `[0, N)`
/// where N is the configured vertex count.
pub type VertexId = usize;

/// Directed graph with adjacency structure.
///
/// Undirected datasets are represented by duplicating each edge in reverse
/// at ingestion time (see `edgelist`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Number of vertices in the graph
    pub num_vertices: usize,

    /// Number of directed edges in the graph
    pub num_edges: usize,

    /// Adjacency list: vertex -> list of out-neighbors
    pub adjacency: Vec<Vec<VertexId>>,
}

impl Graph {
    /// Creates a new empty graph with the specified number of vertices.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            num_vertices,
            num_edges: 0,
            adjacency: vec![Vec::new(); num_vertices],
        }
    }

    /// Builds a graph from a directed edge list.
    ///
    /// Out-of-range endpoints and self-loops are skipped.
    pub fn from_edges(num_vertices: usize, edges: impl IntoIterator<Item = (VertexId, VertexId)>) -> Self {
        let mut graph = Self::new(num_vertices);
        for (u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    /// Adds a directed edge from `u` to `v`.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) {
        if u < self.num_vertices && v < self.num_vertices && u != v {
            self.adjacency[u].push(v);
            self.num_edges += 1;
        }
    }

    /// Returns the out-neighbors of a vertex.
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        &self.adjacency[vertex]
    }

    /// Returns the out-degree of a vertex.
    pub fn degree(&self, vertex: VertexId) -> usize {
        self.adjacency[vertex].len()
    }
}

/// Bounded set of vertex ids with approximate-betweenness scores.
///
/// Holds at most `max_size` entries, retaining the top scorers. Merging two
/// sets is the declared reduction for the `HIGH_BC_SET` aggregation channel:
/// per-id maximum, then top-K retention. Ties between equal scores retain
/// the smaller id, so merge order never changes the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSet {
    max_size: usize,
    entries: BTreeMap<VertexId, f64>,
}

impl ScoredSet {
    /// Creates an empty set retaining at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: BTreeMap::new(),
        }
    }

    /// Inserts a scored id, evicting the lowest scorer if over capacity.
    ///
    /// Non-finite scores are dropped (they cannot be ranked).
    pub fn insert(&mut self, id: VertexId, score: f64) {
        if !score.is_finite() {
            log::warn!("Dropping non-finite betweenness score for vertex {}", id);
            return;
        }
        let entry = self.entries.entry(id).or_insert(score);
        if score > *entry {
            *entry = score;
        }
        self.trim();
    }

    /// Merges another set into this one, keeping the larger capacity bound.
    pub fn merge(&mut self, other: &ScoredSet) {
        if other.max_size > self.max_size {
            self.max_size = other.max_size;
        }
        for (&id, &score) in &other.entries {
            self.insert(id, score);
        }
    }

    /// Vertex ids currently retained, in ascending order.
    pub fn ids(&self) -> Vec<VertexId> {
        self.entries.keys().copied().collect()
    }

    /// Iterates over `(id, score)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        self.entries.iter().map(|(&id, &score)| (id, score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.entries.contains_key(&id)
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_size {
            // Evict the minimum by (score, then larger id), so equal scores
            // keep the smaller id regardless of insertion order. Scores are
            // finite by the insert guard.
            let evict = self
                .entries
                .iter()
                .min_by_key(|(&id, &score)| (NotNan::new(score).unwrap(), Reverse(id)))
                .map(|(&id, _)| id);
            match evict {
                Some(id) => {
                    self.entries.remove(&id);
                }
                None => break,
            }
        }
    }
}

/// Cumulative run statistics, assembled exactly once at termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Final high-betweenness set size (k)
    pub set_size: usize,

    /// Pivot batch size (delta p)
    pub batch_size: usize,

    /// Stability cutoff used for the run
    pub stability_cutoff: usize,

    /// Stability counter target used for the run
    pub stability_counter_target: u32,

    /// Total pivots consumed across the run
    pub pivots_selected: usize,

    /// Fraction of the graph used as pivots
    pub fraction_sampled: f64,

    /// Total synchronous rounds elapsed
    pub supersteps: u64,

    /// Completed cycles (shortest-path + pair-dependency)
    pub cycles: u64,

    /// Wall-clock run time in whole seconds
    pub runtime_seconds: u64,
}
