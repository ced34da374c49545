//! HBSE command-line entry point.
//!
//! Loads a delimiter-separated edge list, materializes the run
//! configuration from a properties file plus `-s key=value` overrides,
//! and runs the approximation to completion.

use anyhow::{anyhow, Context};
use clap::Parser;
use hbse_core::edgelist::{read_edge_list, EdgeListOptions};
use hbse_core::settings::{HbseConfig, Settings};
use hbse_pipeline::run_hbse;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hbse",
    about = "Approximate high-betweenness-centrality vertices via pivot sampling"
)]
struct Args {
    /// Edge list file (one source/target pair per line)
    #[arg(long)]
    graph: PathBuf,

    /// Properties-style settings file (key=value lines)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Individual setting overrides, e.g. -s vertex.count=1000
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Edge list token delimiter (single character)
    #[arg(long, default_value = "\t")]
    delimiter: String,

    /// Duplicate each edge in reverse (undirected input data)
    #[arg(long)]
    undirected: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::new(),
    };
    for pair in &args.overrides {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", pair))?;
        settings.set(key.trim(), value.trim());
    }

    let config = HbseConfig::from_settings(&settings).context("invalid configuration")?;

    let mut delimiter_chars = args.delimiter.chars();
    let delimiter = match (delimiter_chars.next(), delimiter_chars.next()) {
        (Some(c), None) => c,
        _ => return Err(anyhow!("--delimiter must be a single character")),
    };

    let options = EdgeListOptions {
        delimiter,
        reverse_duplicate: args.undirected,
    };
    let graph = read_edge_list(&args.graph, config.vertex_count, &options)
        .with_context(|| format!("loading graph from {}", args.graph.display()))?;

    let outcome = run_hbse(graph, &config)?;

    println!(
        "high-betweenness set ({} ids): {:?}",
        outcome.final_set.len(),
        outcome.final_set
    );
    println!(
        "cycles: {}  supersteps: {}  pivots: {} ({:.1}% of graph)  run time: {}s",
        outcome.stats.cycles,
        outcome.stats.supersteps,
        outcome.stats.pivots_selected,
        outcome.stats.fraction_sampled * 100.0,
        outcome.stats.runtime_seconds
    );
    Ok(())
}
