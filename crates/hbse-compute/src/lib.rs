//! # hbse-compute
//!
//! The per-vertex HBSE computation: distributed Brandes shortest-path
//! relaxation and pair-dependency accumulation, driven entirely by the
//! phase ordinal and pivot batch the coordinator publishes through the
//! aggregation channel.
//!
//! Sub-phases, keyed off the published phase:
//! - **Shortest path start**: pivots seed themselves (distance 0, one
//!   path) and announce distance 1 to their neighbors.
//! - **Shortest path run**: vertices fold incoming path announcements into
//!   per-source distance/path-count/predecessor bookkeeping, re-announcing
//!   on change; a round without changes ends the phase.
//! - **Ping predecessor**: every vertex on a shortest path pings its
//!   predecessors, so predecessors can count their successors.
//! - **Find successors**: pings are tallied; vertices with no successors
//!   are leaves of the shortest-path DAG and immediately send their
//!   dependency shares upstream.
//! - **Dependency run**: shares accumulate; once a vertex has heard from
//!   all successors it forwards its own share to its predecessors;
//!   a round without traffic ends the phase.
//! - **Complete**: each vertex folds the cycle's dependencies into its
//!   running approximation and contributes its score to the bounded
//!   top-K reduction the coordinator reads.

pub mod state;

pub use state::{PathData, VertexState};

use hbse_core::aggregate::RoundSnapshot;
use hbse_core::errors::Result;
use hbse_core::phase::Phase;
use hbse_core::traits::{Outbox, VertexProgram};
use hbse_core::types::{Graph, VertexId};
use std::collections::HashMap;

/// Messages exchanged between vertices.
#[derive(Debug, Clone)]
pub enum HbseMessage {
    /// Shortest-path announcement: `from` reaches `source` at
    /// `distance - 1` via `num_paths` shortest paths.
    Path {
        source: VertexId,
        from: VertexId,
        distance: u64,
        num_paths: u64,
    },
    /// Predecessor ping: `from` lies on a shortest path from `source`
    /// through the receiver.
    Ping { source: VertexId, from: VertexId },
    /// Dependency share for `source`, sent from a successor to a
    /// predecessor on the shortest-path DAG.
    Dependency { source: VertexId, share: f64 },
}

/// The HBSE vertex program.
pub struct HbseVertexProgram {
    max_set_size: usize,
}

impl HbseVertexProgram {
    /// Creates the program; `max_set_size` bounds the per-round top-K
    /// contribution to the high-betweenness reduction.
    pub fn new(max_set_size: usize) -> Self {
        Self { max_set_size }
    }

    fn start_shortest_path(
        &self,
        vertex: VertexId,
        graph: &Graph,
        state: &mut VertexState,
        snapshot: &RoundSnapshot,
        outbox: &mut Outbox<HbseMessage>,
    ) {
        // A new cycle begins after a fold; drop the previous batch's
        // bookkeeping so each cycle contributes exactly once.
        if state.cycle_folded {
            state.path_data.clear();
            state.cycle_folded = false;
        }

        if snapshot.pivots().contains(&vertex) {
            state.path_data.insert(vertex, PathData::source());
            outbox.count_updates(1);
            for &neighbor in graph.neighbors(vertex) {
                outbox.send(
                    neighbor,
                    HbseMessage::Path {
                        source: vertex,
                        from: vertex,
                        distance: 1,
                        num_paths: 1,
                    },
                );
            }
        }
    }

    fn run_shortest_path(
        &self,
        vertex: VertexId,
        graph: &Graph,
        state: &mut VertexState,
        inbox: &[HbseMessage],
        outbox: &mut Outbox<HbseMessage>,
    ) {
        // Fold announcements per source, then re-announce each change once.
        let mut changed_sources: Vec<VertexId> = Vec::new();
        for message in inbox {
            let (source, from, distance, num_paths) = match *message {
                HbseMessage::Path {
                    source,
                    from,
                    distance,
                    num_paths,
                } => (source, from, distance, num_paths),
                _ => continue,
            };

            let data = state.path_data.entry(source).or_insert_with(|| PathData {
                distance: u64::MAX,
                ..PathData::default()
            });

            let changed = if distance < data.distance {
                data.distance = distance;
                data.predecessors.clear();
                data.predecessors.insert(from, num_paths);
                true
            } else if distance == data.distance {
                data.predecessors.insert(from, num_paths) != Some(num_paths)
            } else {
                false
            };

            if changed && !changed_sources.contains(&source) {
                changed_sources.push(source);
            }
        }

        for source in changed_sources {
            outbox.count_updates(1);
            let data = &state.path_data[&source];
            let num_paths = data.num_paths(vertex, source);
            for &neighbor in graph.neighbors(vertex) {
                outbox.send(
                    neighbor,
                    HbseMessage::Path {
                        source,
                        from: vertex,
                        distance: data.distance + 1,
                        num_paths,
                    },
                );
            }
        }
    }

    fn ping_predecessors(
        &self,
        vertex: VertexId,
        state: &VertexState,
        outbox: &mut Outbox<HbseMessage>,
    ) {
        for (&source, data) in &state.path_data {
            if vertex == source {
                continue;
            }
            for &predecessor in data.predecessors.keys() {
                outbox.send(
                    predecessor,
                    HbseMessage::Ping {
                        source,
                        from: vertex,
                    },
                );
            }
        }
    }

    fn find_successors(
        &self,
        vertex: VertexId,
        state: &mut VertexState,
        inbox: &[HbseMessage],
        outbox: &mut Outbox<HbseMessage>,
    ) {
        let mut successor_counts: HashMap<VertexId, usize> = HashMap::new();
        for message in inbox {
            if let HbseMessage::Ping { source, .. } = message {
                *successor_counts.entry(*source).or_insert(0) += 1;
            }
        }
        for (source, count) in successor_counts {
            if let Some(data) = state.path_data.get_mut(&source) {
                data.num_successors = count;
            } else {
                log::warn!(
                    "Vertex {} pinged for unknown source {}; ignoring",
                    vertex,
                    source
                );
            }
        }

        // Leaves of the shortest-path DAG start the backward accumulation.
        for (&source, data) in state.path_data.iter_mut() {
            if vertex != source && data.num_successors == 0 && !data.forwarded {
                forward_dependency(vertex, source, data, outbox);
                outbox.count_updates(1);
            }
        }
    }

    fn run_dependency(
        &self,
        vertex: VertexId,
        state: &mut VertexState,
        inbox: &[HbseMessage],
        outbox: &mut Outbox<HbseMessage>,
    ) {
        for message in inbox {
            let (source, share) = match *message {
                HbseMessage::Dependency { source, share } => (source, share),
                _ => continue,
            };
            let Some(data) = state.path_data.get_mut(&source) else {
                log::warn!(
                    "Vertex {} received a dependency share for unknown source {}; ignoring",
                    vertex,
                    source
                );
                continue;
            };
            data.dependency += share;
            data.deps_received += 1;
            outbox.count_updates(1);
        }

        // Forward once every successor has reported.
        for (&source, data) in state.path_data.iter_mut() {
            if vertex != source
                && !data.forwarded
                && data.num_successors > 0
                && data.deps_received >= data.num_successors
            {
                forward_dependency(vertex, source, data, outbox);
            }
        }
    }

    fn complete_cycle(
        &self,
        vertex: VertexId,
        state: &mut VertexState,
        outbox: &mut Outbox<HbseMessage>,
    ) {
        if !state.cycle_folded {
            let folded: f64 = state
                .path_data
                .iter()
                .filter(|(&source, _)| vertex != source)
                .map(|(_, data)| data.dependency)
                .sum();
            state.approx_betweenness += folded;
            state.cycle_folded = true;
        }
        if state.approx_betweenness > 0.0 {
            outbox.contribute_score(vertex, state.approx_betweenness, self.max_set_size);
        }
    }
}

/// Sends `(σ_pred / σ_v) · (1 + δ_v)` to each predecessor and marks the
/// vertex forwarded.
fn forward_dependency(
    vertex: VertexId,
    source: VertexId,
    data: &mut PathData,
    outbox: &mut Outbox<HbseMessage>,
) {
    let num_paths = data.num_paths(vertex, source);
    if num_paths == 0 {
        // An entry without predecessors for a non-source vertex cannot
        // happen through the message protocol; guard the division anyway.
        data.forwarded = true;
        return;
    }
    let credit = 1.0 + data.dependency;
    for (&predecessor, &through) in &data.predecessors {
        let share = (through as f64 / num_paths as f64) * credit;
        outbox.send(predecessor, HbseMessage::Dependency { source, share });
    }
    data.forwarded = true;
}

impl VertexProgram for HbseVertexProgram {
    type Message = HbseMessage;
    type State = VertexState;

    fn compute(
        &self,
        vertex: VertexId,
        graph: &Graph,
        state: &mut VertexState,
        inbox: &[HbseMessage],
        snapshot: &RoundSnapshot,
        outbox: &mut Outbox<HbseMessage>,
    ) -> Result<()> {
        // Idle until the coordinator publishes its first phase.
        let Some(ordinal) = snapshot.phase_ordinal() else {
            return Ok(());
        };
        let phase = Phase::from_ordinal(ordinal)?;

        match phase {
            Phase::Start | Phase::Finished => {}
            Phase::ShortestPathStart => {
                self.start_shortest_path(vertex, graph, state, snapshot, outbox)
            }
            Phase::ShortestPathRun => self.run_shortest_path(vertex, graph, state, inbox, outbox),
            Phase::PairDependencyPingPredecessor => self.ping_predecessors(vertex, state, outbox),
            Phase::PairDependencyFindSuccessors => {
                self.find_successors(vertex, state, inbox, outbox)
            }
            Phase::PairDependencyRun => self.run_dependency(vertex, state, inbox, outbox),
            Phase::PairDependencyComplete => self.complete_cycle(vertex, state, outbox),
        }
        Ok(())
    }
}
