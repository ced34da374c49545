//! The master coordination state machine.
//!
//! Runs once per round, after the barrier, reading the round's aggregated
//! values and publishing the next phase (and pivot batch) for every vertex
//! to observe. Coordinates the full approximation:
//!
//! 1. select pivots
//! 2. monitor the shortest-path phase for completion (zero updates)
//! 3. start the pair-dependency phase
//! 4. monitor pair dependency for completion
//! 5. check high-betweenness set stability
//! 6. if stable (or the pivot pool is exhausted) persist and halt, else
//!    select new pivots and start the next cycle
//!
//! All coordinator state — pivot pool, counters, the RNG — lives behind
//! the single per-round callback; the barrier serializes every access.
//! Workers never sample: a single consistent pivot batch is what every
//! vertex observes in a round.

use crate::output::ResultSink;
use crate::pivot::PivotPool;
use crate::stability::{set_delta, Stability, StabilityTracker};
use crate::telemetry::{TelemetryEvent, TelemetryWriter};
use hbse_core::errors::{HbseError, Result};
use hbse_core::phase::Phase;
use hbse_core::settings::HbseConfig;
use hbse_core::traits::{MasterCompute, MasterContext};
use hbse_core::types::{RunStats, VertexId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::time::Instant;

/// Product of a finished run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stats: RunStats,
    pub final_set: Vec<VertexId>,
}

/// Master coordinator for the HBSE computation.
pub struct HbseMasterCompute {
    config: HbseConfig,
    phase: Phase,
    pool: PivotPool,
    stability: StabilityTracker,
    rng: ChaCha8Rng,
    high_bc_set: HashSet<VertexId>,
    shortest_path_phases_completed: u32,
    cycles_completed: u64,
    sink: Box<dyn ResultSink>,
    telemetry: Option<TelemetryWriter>,
    started: Instant,
    outcome: Option<RunOutcome>,
}

impl HbseMasterCompute {
    /// Creates the coordinator from a validated configuration.
    ///
    /// The RNG is seeded when the configuration carries a seed and drawn
    /// from the OS otherwise; a manually supplied pivot list pre-populates
    /// the pool and is published as the first batch instead of sampling.
    pub fn new(config: HbseConfig, sink: Box<dyn ResultSink>) -> Self {
        let rng = match config.random_seed {
            Some(seed) => {
                log::info!("Set random seed: {}", seed);
                ChaCha8Rng::seed_from_u64(seed)
            }
            None => ChaCha8Rng::from_entropy(),
        };

        let mut pool = PivotPool::new(config.vertex_count);
        if !config.initial_pivots.is_empty() {
            for &pivot in &config.initial_pivots {
                log::info!("Manually added pivot: {}", pivot);
            }
            pool.seed_manual(&config.initial_pivots);
        }

        let telemetry = config.telemetry_path.as_ref().and_then(|path| {
            TelemetryWriter::create(path)
                .map_err(|e| {
                    log::warn!(
                        "Failed to create telemetry writer at {}: {}. Telemetry will be disabled.",
                        path.display(),
                        e
                    );
                    e
                })
                .ok()
        });

        let stability = StabilityTracker::new(
            config.stability_cutoff,
            config.stability_counter_target,
        );

        Self {
            phase: Phase::Start,
            pool,
            stability,
            rng,
            high_bc_set: HashSet::new(),
            shortest_path_phases_completed: 0,
            cycles_completed: 0,
            sink,
            telemetry,
            started: Instant::now(),
            outcome: None,
            config,
        }
    }

    /// Current state machine phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The run product, available once the coordinator reached FINISHED.
    pub fn into_outcome(self) -> Result<RunOutcome> {
        self.outcome.ok_or_else(|| {
            HbseError::internal("computation halted without reaching FINISHED")
        })
    }

    fn transition(&mut self, ctx: &mut MasterContext<'_>, next: Phase) {
        self.phase = next;
        ctx.publish_phase(next.ordinal());
        log::info!("Superstep: {} Switched to State: {}", ctx.round(), next);
    }

    fn choose_pivots(&mut self, ctx: &mut MasterContext<'_>, batch_size: usize) {
        log::info!("Selecting new pivots.");
        let batch = self.pool.choose(&mut self.rng, batch_size);
        log::info!("Pivot set: {:?}", batch);
        ctx.publish_pivots(batch);
    }

    fn write_telemetry(&mut self, event: TelemetryEvent) {
        if let Some(writer) = self.telemetry.as_mut() {
            if let Err(e) = writer.write_event(&event) {
                log::warn!("Failed to write telemetry record: {}", e);
            }
        }
    }

    fn complete_cycle(&mut self, ctx: &mut MasterContext<'_>) {
        let round = ctx.round();
        let incoming: HashSet<VertexId> = ctx
            .high_bc_set()
            .map(|set| set.ids().into_iter().collect())
            .unwrap_or_default();
        let delta = set_delta(&self.high_bc_set, &incoming);
        self.high_bc_set = incoming;
        log::info!("High Betweenness Set Delta: {}", delta);

        self.cycles_completed += 1;
        let log_prefix = format!("Finished Cycle: {}", self.cycles_completed);

        let verdict = self.stability.observe(delta);
        self.write_telemetry(TelemetryEvent::cycle(
            self.cycles_completed,
            round,
            delta,
            self.stability.counter(),
            self.pool.selected_count(),
            self.high_bc_set.len(),
        ));

        match verdict {
            Stability::Converged => {
                log::info!(
                    "{} Set Delta <= cutoff value; counter={} approximation complete.",
                    log_prefix,
                    self.stability.counter()
                );
                self.transition(ctx, Phase::Finished);
            }
            Stability::Holding(counter) if !self.pool.exhausted() => {
                log::info!("{} Set Delta <= cutoff value; counter={}", log_prefix, counter);
                self.choose_pivots(ctx, self.config.batch_size);
                self.transition(ctx, Phase::ShortestPathStart);
            }
            Stability::Reset if !self.pool.exhausted() => {
                log::info!("{} Delta did not meet cutoff, starting next cycle.", log_prefix);
                self.choose_pivots(ctx, self.config.batch_size);
                self.transition(ctx, Phase::ShortestPathStart);
            }
            Stability::Holding(_) | Stability::Reset => {
                log::info!("{} All possible pivots selected, exiting", log_prefix);
                self.transition(ctx, Phase::Finished);
            }
        }
    }

    fn finish(&mut self, ctx: &mut MasterContext<'_>) -> Result<()> {
        ctx.halt();

        let mut final_set: Vec<VertexId> = self.high_bc_set.iter().copied().collect();
        final_set.sort_unstable();

        let stats = RunStats {
            set_size: final_set.len(),
            batch_size: self.config.batch_size,
            stability_cutoff: self.config.stability_cutoff,
            stability_counter_target: self.config.stability_counter_target,
            pivots_selected: self.pool.selected_count(),
            fraction_sampled: self.pool.selected_count() as f64
                / self.config.vertex_count as f64,
            supersteps: ctx.round() + 1,
            cycles: self.cycles_completed,
            runtime_seconds: self.started.elapsed().as_secs(),
        };

        self.sink.write_final_set(&final_set)?;
        self.sink.write_stats(&stats)?;
        self.write_telemetry(TelemetryEvent::run_complete(stats.clone()));

        self.outcome = Some(RunOutcome { stats, final_set });
        Ok(())
    }
}

impl MasterCompute for HbseMasterCompute {
    fn compute(&mut self, ctx: &mut MasterContext<'_>) -> Result<()> {
        let round = ctx.round();
        log::info!("Superstep: {} starting in State: {}", round, self.phase);

        match self.phase {
            Phase::Start => {
                if self.pool.current().is_empty() {
                    let batch_size = if round == 0 {
                        self.config.initial_batch_size
                    } else {
                        self.config.batch_size
                    };
                    self.choose_pivots(ctx, batch_size);
                } else {
                    // Manually supplied first batch: publish it unsampled.
                    ctx.publish_pivots(self.pool.current().to_vec());
                }
                self.transition(ctx, Phase::ShortestPathStart);
            }
            Phase::ShortestPathStart => {
                log::info!("Superstep: {} Paths updated: {}", round, ctx.update_count());
                self.transition(ctx, Phase::ShortestPathRun);
            }
            Phase::ShortestPathRun => {
                let update_count = ctx.update_count();
                log::info!("Superstep: {} Paths updated: {}", round, update_count);
                if update_count == 0 {
                    self.shortest_path_phases_completed += 1;
                    if self.shortest_path_phases_completed == self.config.shortest_path_phases {
                        self.transition(ctx, Phase::PairDependencyPingPredecessor);
                    } else {
                        self.choose_pivots(ctx, self.config.batch_size);
                        self.transition(ctx, Phase::ShortestPathStart);
                    }
                    log::info!(
                        "Superstep: {} UPDATE COUNT 0, shortest path phase {} of {}",
                        round,
                        self.shortest_path_phases_completed,
                        self.config.shortest_path_phases
                    );
                }
            }
            Phase::PairDependencyPingPredecessor => {
                self.shortest_path_phases_completed = 0;
                self.transition(ctx, Phase::PairDependencyFindSuccessors);
            }
            Phase::PairDependencyFindSuccessors => {
                self.transition(ctx, Phase::PairDependencyRun);
            }
            Phase::PairDependencyRun => {
                let update_count = ctx.update_count();
                if update_count == 0 {
                    self.transition(ctx, Phase::PairDependencyComplete);
                }
                log::info!(
                    "Superstep: {} UPDATE COUNT {}, State: {}",
                    round,
                    update_count,
                    self.phase
                );
            }
            Phase::PairDependencyComplete => {
                self.complete_cycle(ctx);
            }
            Phase::Finished => {
                self.finish(ctx)?;
            }
        }
        Ok(())
    }
}
