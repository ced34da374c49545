//! # hbse-engine
//!
//! Bulk-synchronous superstep runtime for the HBSE platform: a single
//! process stand-in for the round-synchronized execution engine the
//! coordinator is written against.
//!
//! Provides, per round:
//! - delivery of the previous round's inter-vertex messages,
//! - partition-parallel vertex execution behind a global barrier,
//! - round-scoped aggregation snapshots with declared reductions,
//! - one master callback, whose halt signal ends the run.

pub mod runtime;
pub mod snapshot;

pub use runtime::{RunSummary, SuperstepRuntime};
pub use snapshot::{apply_master_writes, SnapshotBuilder};
