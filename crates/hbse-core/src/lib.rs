//! # hbse-core
//!
//! Core types, traits, and errors for the HBSE (high-betweenness set
//! extraction) platform.
//!
//! This crate defines the fundamental abstractions used across all HBSE
//! components:
//! - **Types**: graph representation, bounded scored sets, run statistics
//! - **Traits**: `VertexProgram`, `MasterCompute`, and the round-scoped
//!   aggregation channel they communicate through
//! - **Config**: the flat settings blob and the validated `HbseConfig`
//! - **Errors**: unified error handling with `HbseError`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   hbse-core     │  ← types / traits / errors
//! └─────────────────┘
//!         ▲
//!    ┌────┴──────────────┐
//!    │                   │
//! ┌──▼──────────┐  ┌─────▼────────┐
//! │ hbse-engine │  │ hbse-compute │
//! └─────────────┘  └──────────────┘
//!         ▲                ▲
//!         └───────┬────────┘
//!                 │
//!        ┌────────▼────────┐
//!        │  hbse-pipeline  │
//!        └─────────────────┘
//! ```

pub mod aggregate;
pub mod edgelist;
pub mod errors;
pub mod phase;
pub mod settings;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use aggregate::{AggKey, AggValue, RoundSnapshot};
pub use errors::{HbseError, Result};
pub use phase::Phase;
pub use settings::{HbseConfig, Settings};
pub use traits::{MasterCompute, MasterContext, Outbox, VertexProgram};
pub use types::{Graph, RunStats, ScoredSet, VertexId};
