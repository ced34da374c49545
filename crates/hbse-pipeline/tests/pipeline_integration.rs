//! End-to-end runs of the full HBSE stack: coordinator, superstep
//! runtime, and per-vertex computation over small hand-built graphs.

use hbse_core::settings::HbseConfig;
use hbse_core::types::Graph;
use hbse_pipeline::{run_hbse, FINAL_SET_CSV, STATS_CSV};
use std::path::Path;
use tempfile::tempdir;

/// Undirected path graph 0 - 1 - ... - (n-1).
fn path_graph(n: usize) -> Graph {
    let mut edges = Vec::new();
    for v in 0..n - 1 {
        edges.push((v, v + 1));
        edges.push((v + 1, v));
    }
    Graph::from_edges(n, edges)
}

/// Undirected star: center 0 connected to every leaf.
fn star_graph(leaves: usize) -> Graph {
    let mut edges = Vec::new();
    for leaf in 1..=leaves {
        edges.push((0, leaf));
        edges.push((leaf, 0));
    }
    Graph::from_edges(leaves + 1, edges)
}

fn config_for(output_dir: &Path, vertex_count: usize, batch_size: usize) -> HbseConfig {
    HbseConfig {
        output_dir: output_dir.to_path_buf(),
        vertex_count,
        batch_size,
        initial_batch_size: batch_size,
        max_high_bc_set_size: 3,
        stability_cutoff: 0,
        stability_counter_target: 3,
        shortest_path_phases: 1,
        random_seed: Some(1234),
        initial_pivots: Vec::new(),
        telemetry_path: None,
        max_supersteps: 10_000,
    }
}

#[test]
fn path_graph_extracts_the_middle_vertices() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    // Batch = N: one cycle consumes every pivot, so the result is the
    // exact betweenness ranking. On a 5-path that is 2 (highest), then
    // 1 and 3; the endpoints score zero and never appear.
    let config = config_for(dir.path(), 5, 5);
    let outcome = run_hbse(path_graph(5), &config).unwrap();

    assert_eq!(outcome.final_set, vec![1, 2, 3]);
    assert_eq!(outcome.stats.cycles, 1);
    assert_eq!(outcome.stats.pivots_selected, 5);
    assert!((outcome.stats.fraction_sampled - 1.0).abs() < 1e-12);
}

#[test]
fn pivot_exhaustion_forces_termination() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    // Cutoff high enough that stability alone would keep the run going
    // for 50 cycles; exhaustion must end it after the first.
    let mut config = config_for(dir.path(), 5, 5);
    config.stability_cutoff = 100;
    config.stability_counter_target = 50;

    let outcome = run_hbse(path_graph(5), &config).unwrap();
    assert_eq!(outcome.stats.cycles, 1);
    assert_eq!(outcome.stats.pivots_selected, 5);
}

#[test]
fn star_graph_extracts_only_the_center() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    // Leaves accumulate zero betweenness and never contribute, so the
    // final set holds just the hub even though up to 3 ids would fit.
    let config = config_for(dir.path(), 6, 6);
    let outcome = run_hbse(star_graph(5), &config).unwrap();

    assert_eq!(outcome.final_set, vec![0]);
}

#[test]
fn stability_convergence_ends_the_run_before_exhaustion() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    // With the cutoff at the set capacity every cycle is "stable", so
    // two cycles satisfy the counter target and the run converges having
    // sampled only two of five pivots.
    let mut config = config_for(dir.path(), 5, 1);
    config.stability_cutoff = 3;
    config.stability_counter_target = 2;

    let outcome = run_hbse(path_graph(5), &config).unwrap();
    assert_eq!(outcome.stats.cycles, 2);
    assert_eq!(outcome.stats.pivots_selected, 2);
    assert!(outcome.stats.pivots_selected < 5);
}

#[test]
fn seeded_runs_are_reproducible() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();

    let mut config_a = config_for(dir_a.path(), 7, 2);
    config_a.random_seed = Some(99);
    let mut config_b = config_for(dir_b.path(), 7, 2);
    config_b.random_seed = Some(99);

    let outcome_a = run_hbse(path_graph(7), &config_a).unwrap();
    let outcome_b = run_hbse(path_graph(7), &config_b).unwrap();

    assert_eq!(outcome_a.final_set, outcome_b.final_set);
    assert_eq!(outcome_a.stats.cycles, outcome_b.stats.cycles);
    assert_eq!(
        outcome_a.stats.pivots_selected,
        outcome_b.stats.pivots_selected
    );
}

#[test]
fn final_set_csv_round_trips() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    let config = config_for(dir.path(), 5, 5);
    let outcome = run_hbse(path_graph(5), &config).unwrap();

    let contents = std::fs::read_to_string(dir.path().join(FINAL_SET_CSV)).unwrap();
    let written: Vec<usize> = contents
        .lines()
        .map(|line| line.parse().unwrap())
        .collect();

    assert_eq!(written, outcome.final_set);
    let unique: std::collections::HashSet<usize> = written.iter().copied().collect();
    assert_eq!(unique.len(), written.len(), "duplicate lines in final set");
}

#[test]
fn stats_csv_reflects_the_run() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    let config = config_for(dir.path(), 5, 5);
    let outcome = run_hbse(path_graph(5), &config).unwrap();

    let contents = std::fs::read_to_string(dir.path().join(STATS_CSV)).unwrap();
    assert!(contents.contains(&format!("k: {}", outcome.final_set.len())));
    assert!(contents.contains("delta p: 5"));
    assert!(contents.contains("pivots selected: 5"));
    assert!(contents.contains(&format!("cycles: {}", outcome.stats.cycles)));
    assert!(contents.contains(&format!("supersteps: {}", outcome.stats.supersteps)));
}

#[test]
fn telemetry_records_each_cycle() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    let mut config = config_for(dir.path(), 5, 5);
    let telemetry_path = dir.path().join("telemetry.jsonl");
    config.telemetry_path = Some(telemetry_path.clone());

    let outcome = run_hbse(path_graph(5), &config).unwrap();

    let contents = std::fs::read_to_string(&telemetry_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    // One record per cycle plus the final run_complete record.
    assert_eq!(lines.len() as u64, outcome.stats.cycles + 1);
    assert!(lines.last().unwrap().contains("run_complete"));
    for line in &lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value.get("event").is_some());
    }
}

#[test]
fn manual_initial_pivots_are_used_first() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    // A single manual pivot and a single-cycle convergence window: only
    // that pivot is ever consumed.
    let mut config = config_for(dir.path(), 5, 1);
    config.initial_pivots = vec![2];
    config.stability_cutoff = 3;
    config.stability_counter_target = 1;

    let outcome = run_hbse(path_graph(5), &config).unwrap();
    assert_eq!(outcome.stats.pivots_selected, 1);
    assert_eq!(outcome.stats.cycles, 1);
    // Pivot 2 reaches every other vertex, crediting the path interior.
    assert!(outcome.final_set.contains(&1));
    assert!(outcome.final_set.contains(&3));
}

#[test]
fn vertex_count_mismatch_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path(), 9, 2);
    let err = run_hbse(path_graph(5), &config).unwrap_err();
    assert!(matches!(err, hbse_core::HbseError::ConfigError(_)));
}

#[test]
fn multiple_shortest_path_phases_accumulate_before_dependency() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();

    // Two sub-batches of 2 pivots feed one dependency phase per cycle,
    // so pivots are consumed twice as fast per cycle.
    let mut config = config_for(dir.path(), 8, 2);
    config.shortest_path_phases = 2;
    config.stability_cutoff = 100;
    config.stability_counter_target = 50;

    let outcome = run_hbse(path_graph(8), &config).unwrap();
    assert_eq!(outcome.stats.pivots_selected, 8);
    assert_eq!(outcome.stats.cycles, 2);
}
