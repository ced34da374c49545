//! # hbse-pipeline
//!
//! Master coordination state machine and convergence protocol for HBSE
//! (high-betweenness set extraction): pivot-batch sampling, phase
//! sequencing across synchronous rounds, high-betweenness-set stability
//! detection, and result persistence.
//!
//! The coordinator drives the overall cycle — pivot selection →
//! shortest-path phase → pair-dependency phase → stability check → repeat
//! or finish — publishing phase and pivot state through the round-scoped
//! aggregation channel that `hbse-engine` provides and `hbse-compute`
//! consumes.

pub mod driver;
pub mod master;
pub mod output;
pub mod pivot;
pub mod stability;
pub mod telemetry;

pub use driver::{run_hbse, run_hbse_with_sink};
pub use master::{HbseMasterCompute, RunOutcome};
pub use output::{CsvResultSink, ResultSink, FINAL_SET_CSV, STATS_CSV};
pub use pivot::PivotPool;
pub use stability::{set_delta, Stability, StabilityTracker};
pub use telemetry::{TelemetryEvent, TelemetryWriter};
