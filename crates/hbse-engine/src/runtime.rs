//! The bulk-synchronous superstep runtime.
//!
//! One round: deliver the previous round's messages, run every vertex once
//! (one task per partition, joined before anything else happens), merge the
//! partitions' aggregate contributions in partition order, then invoke the
//! master callback exactly once and publish its writes for the next round.
//!
//! The barrier is the `rayon` join: the master never observes
//! partial-round state, and no coordinator state needs locking.

use crate::snapshot::{apply_master_writes, SnapshotBuilder};
use hbse_core::aggregate::RoundSnapshot;
use hbse_core::errors::{HbseError, Result};
use hbse_core::traits::{MasterCompute, MasterContext, Outbox, VertexProgram};
use hbse_core::types::{Graph, ScoredSet, VertexId};
use rayon::prelude::*;
use std::time::Instant;

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Rounds executed, including the halting round.
    pub rounds: u64,

    /// Wall-clock duration of the round loop in milliseconds.
    pub elapsed_ms: u128,
}

/// One partition's per-round output.
type PartitionOutput<M> = (Vec<(VertexId, M)>, i64, Option<ScoredSet>);

/// Bulk-synchronous runtime executing a [`VertexProgram`] under a
/// [`MasterCompute`] coordinator.
pub struct SuperstepRuntime<P: VertexProgram> {
    graph: Graph,
    program: P,
    states: Vec<P::State>,
    inboxes: Vec<Vec<P::Message>>,
    num_partitions: usize,
    max_supersteps: u64,
}

impl<P: VertexProgram> SuperstepRuntime<P> {
    /// Creates a runtime over the given graph with default-initialized
    /// vertex states.
    pub fn new(graph: Graph, program: P) -> Self {
        let n = graph.num_vertices;
        let mut states = Vec::with_capacity(n);
        states.resize_with(n, P::State::default);
        Self {
            graph,
            program,
            states,
            inboxes: vec![Vec::new(); n],
            num_partitions: rayon::current_num_threads().max(1),
            max_supersteps: 1_000_000,
        }
    }

    /// Overrides the partition count (fixing it makes runs reproducible
    /// across machines).
    pub fn with_partitions(mut self, num_partitions: usize) -> Self {
        self.num_partitions = num_partitions.max(1);
        self
    }

    /// Overrides the round safety valve.
    pub fn with_max_supersteps(mut self, max_supersteps: u64) -> Self {
        self.max_supersteps = max_supersteps;
        self
    }

    /// Runs rounds until the master signals the global halt.
    ///
    /// Exceeding the round cap is fatal: the coordinator is expected to
    /// converge, and an unbounded loop means its termination logic broke.
    pub fn run(&mut self, master: &mut dyn MasterCompute) -> Result<RunSummary> {
        let started = Instant::now();
        let mut snapshot = RoundSnapshot::default();

        for round in 0..self.max_supersteps {
            let (outputs, next_inboxes_len) = self.run_partitions(&snapshot)?;

            let mut builder = SnapshotBuilder::carrying(&snapshot);
            let mut next_inboxes: Vec<Vec<P::Message>> = Vec::with_capacity(next_inboxes_len);
            next_inboxes.resize_with(next_inboxes_len, Vec::new);
            for (messages, updates, scores) in outputs {
                for (to, message) in messages {
                    match next_inboxes.get_mut(to) {
                        Some(inbox) => inbox.push(message),
                        None => {
                            return Err(HbseError::internal(format!(
                                "vertex program sent a message to vertex {} outside [0, {})",
                                to, next_inboxes_len
                            )));
                        }
                    }
                }
                builder.add_contribution(updates, scores);
            }

            let merged = builder.build();
            log::debug!(
                "Superstep {}: update count {}, {} queued messages",
                round,
                merged.update_count(),
                next_inboxes.iter().map(Vec::len).sum::<usize>()
            );

            let mut ctx = MasterContext::new(round, &merged);
            master.compute(&mut ctx)?;
            let (phase_write, pivot_write, halt) = ctx.into_writes();

            snapshot = apply_master_writes(merged, phase_write, pivot_write);
            self.inboxes = next_inboxes;

            if halt {
                let elapsed_ms = started.elapsed().as_millis();
                log::info!("Computation halted after {} supersteps ({} ms)", round + 1, elapsed_ms);
                return Ok(RunSummary {
                    rounds: round + 1,
                    elapsed_ms,
                });
            }
        }

        Err(HbseError::internal(format!(
            "computation did not halt within max.supersteps = {}",
            self.max_supersteps
        )))
    }

    /// Fans one round out across partitions and joins them.
    fn run_partitions(
        &mut self,
        snapshot: &RoundSnapshot,
    ) -> Result<(Vec<PartitionOutput<P::Message>>, usize)> {
        let n = self.graph.num_vertices;
        if n == 0 {
            return Ok((Vec::new(), 0));
        }
        let chunk = n.div_ceil(self.num_partitions);

        let graph = &self.graph;
        let program = &self.program;
        let inboxes = std::mem::take(&mut self.inboxes);

        let outputs: Result<Vec<PartitionOutput<P::Message>>> = self
            .states
            .par_chunks_mut(chunk)
            .zip(inboxes.par_chunks(chunk))
            .enumerate()
            .map(|(partition, (states, inboxes))| {
                let base = partition * chunk;
                let mut outbox = Outbox::new();
                for (offset, (state, inbox)) in states.iter_mut().zip(inboxes.iter()).enumerate() {
                    program.compute(base + offset, graph, state, inbox, snapshot, &mut outbox)?;
                }
                Ok(outbox.into_parts())
            })
            .collect();

        Ok((outputs?, n))
    }

    /// Read access to a vertex state (post-run inspection and tests).
    pub fn vertex_state(&self, vertex: VertexId) -> &P::State {
        &self.states[vertex]
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbse_core::aggregate::RoundSnapshot;
    use hbse_core::traits::{MasterCompute, MasterContext, Outbox, VertexProgram};

    /// Flood program: every vertex forwards a token to its neighbors each
    /// round and counts one update per received token.
    struct Flood;

    impl VertexProgram for Flood {
        type Message = u64;
        type State = u64;

        fn compute(
            &self,
            vertex: usize,
            graph: &Graph,
            state: &mut u64,
            inbox: &[u64],
            snapshot: &RoundSnapshot,
            outbox: &mut Outbox<u64>,
        ) -> Result<()> {
            if snapshot.phase_ordinal().is_none() {
                // Seed round: vertex 0 starts the flood.
                if vertex == 0 {
                    for &w in graph.neighbors(vertex) {
                        outbox.send(w, 1);
                    }
                }
                return Ok(());
            }
            for &token in inbox {
                *state += token;
                outbox.count_updates(1);
                for &w in graph.neighbors(vertex) {
                    outbox.send(w, token);
                }
            }
            Ok(())
        }
    }

    /// Master that publishes a phase once and halts when a round goes quiet.
    struct QuietMaster {
        rounds_seen: u64,
    }

    impl MasterCompute for QuietMaster {
        fn compute(&mut self, ctx: &mut MasterContext<'_>) -> Result<()> {
            self.rounds_seen += 1;
            if ctx.round() == 0 {
                ctx.publish_phase(1);
                return Ok(());
            }
            if ctx.update_count() == 0 {
                ctx.halt();
            }
            Ok(())
        }
    }

    #[test]
    fn runtime_runs_until_quiet_and_halts() {
        let _ = env_logger::builder().is_test(true).try_init();

        // Path 0 -> 1 -> 2: the token reaches 1 then 2, then silence.
        let graph = Graph::from_edges(3, vec![(0, 1), (1, 2)]);
        let mut runtime = SuperstepRuntime::new(graph, Flood).with_partitions(2);
        let mut master = QuietMaster { rounds_seen: 0 };

        let summary = runtime.run(&mut master).unwrap();
        assert_eq!(master.rounds_seen, summary.rounds);
        assert_eq!(*runtime.vertex_state(1), 1);
        assert_eq!(*runtime.vertex_state(2), 1);
        assert_eq!(*runtime.vertex_state(0), 0);
    }

    #[test]
    fn round_cap_is_fatal() {
        struct NeverHalt;
        impl MasterCompute for NeverHalt {
            fn compute(&mut self, _ctx: &mut MasterContext<'_>) -> Result<()> {
                Ok(())
            }
        }

        let graph = Graph::from_edges(2, vec![(0, 1)]);
        let mut runtime = SuperstepRuntime::new(graph, Flood).with_max_supersteps(5);
        let err = runtime.run(&mut NeverHalt).unwrap_err();
        assert!(matches!(err, HbseError::Internal(_)));
    }

    #[test]
    fn out_of_range_message_is_fatal() {
        struct Stray;
        impl VertexProgram for Stray {
            type Message = u64;
            type State = ();

            fn compute(
                &self,
                vertex: usize,
                _graph: &Graph,
                _state: &mut (),
                _inbox: &[u64],
                _snapshot: &RoundSnapshot,
                outbox: &mut Outbox<u64>,
            ) -> Result<()> {
                if vertex == 0 {
                    outbox.send(99, 1);
                }
                Ok(())
            }
        }
        struct Never;
        impl MasterCompute for Never {
            fn compute(&mut self, _ctx: &mut MasterContext<'_>) -> Result<()> {
                Ok(())
            }
        }

        let graph = Graph::from_edges(2, vec![(0, 1)]);
        let mut runtime = SuperstepRuntime::new(graph, Stray).with_max_supersteps(3);
        let err = runtime.run(&mut Never).unwrap_err();
        assert!(matches!(err, HbseError::Internal(_)));
    }
}
