//! Assembles a full run: vertex program, superstep runtime, coordinator,
//! result sink.

use crate::master::{HbseMasterCompute, RunOutcome};
use crate::output::{CsvResultSink, ResultSink};
use hbse_compute::HbseVertexProgram;
use hbse_core::errors::{HbseError, Result};
use hbse_core::settings::HbseConfig;
use hbse_core::types::Graph;
use hbse_engine::SuperstepRuntime;

/// Runs the HBSE approximation, writing results into the configured
/// output directory.
pub fn run_hbse(graph: Graph, config: &HbseConfig) -> Result<RunOutcome> {
    let sink = CsvResultSink::new(&config.output_dir)?;
    run_hbse_with_sink(graph, config, Box::new(sink))
}

/// Runs the HBSE approximation against a caller-supplied result sink.
pub fn run_hbse_with_sink(
    graph: Graph,
    config: &HbseConfig,
    sink: Box<dyn ResultSink>,
) -> Result<RunOutcome> {
    if graph.num_vertices != config.vertex_count {
        return Err(HbseError::config(format!(
            "vertex.count = {} does not match the loaded graph ({} vertices)",
            config.vertex_count, graph.num_vertices
        )));
    }

    log::info!(
        "Starting HBSE on {} vertices / {} edges (batch size {}, set size {})",
        graph.num_vertices,
        graph.num_edges,
        config.batch_size,
        config.max_high_bc_set_size
    );

    let program = HbseVertexProgram::new(config.max_high_bc_set_size);
    let mut master = HbseMasterCompute::new(config.clone(), sink);
    let mut runtime =
        SuperstepRuntime::new(graph, program).with_max_supersteps(config.max_supersteps);

    let summary = runtime.run(&mut master)?;
    log::info!(
        "HBSE finished in {} supersteps ({} ms)",
        summary.rounds,
        summary.elapsed_ms
    );

    master.into_outcome()
}
