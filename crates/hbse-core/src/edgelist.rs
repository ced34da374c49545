//! Delimiter-separated edge list ingestion.
//!
//! Each line holds at least a source id and a target id, with an optional
//! third token (an edge value) that HBSE ignores — the computation is
//! unweighted. Undirected datasets set `reverse_duplicate`, which inserts
//! the reverse of every edge.
//!
//! Ids must already be integers in `[0, vertex_count)`; this reader does
//! no relabeling.

use crate::errors::{HbseError, Result};
use crate::types::Graph;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Options for reading a delimiter-separated edge list.
#[derive(Debug, Clone)]
pub struct EdgeListOptions {
    /// Token delimiter (default: tab).
    pub delimiter: char,

    /// Insert the reverse of every edge (undirected datasets).
    pub reverse_duplicate: bool,
}

impl Default for EdgeListOptions {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            reverse_duplicate: false,
        }
    }
}

/// Reads an edge list file into a [`Graph`] with `vertex_count` vertices.
///
/// Fatal on malformed lines (fewer than two tokens, non-integer ids) and
/// on ids outside `[0, vertex_count)`; every error names the line number.
/// Self-loops are skipped with a warning.
pub fn read_edge_list<P: AsRef<Path>>(
    path: P,
    vertex_count: usize,
    options: &EdgeListOptions,
) -> Result<Graph> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|e| {
        HbseError::Internal(format!(
            "failed to open edge list '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    let mut graph = Graph::new(vertex_count);
    for (line_num, line_result) in BufReader::new(file).lines().enumerate() {
        let line = line_result.map_err(|e| {
            HbseError::Internal(format!(
                "failed to read line {} of '{}': {}",
                line_num + 1,
                path_ref.display(),
                e
            ))
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split(options.delimiter).map(str::trim);
        let source = tokens.next().filter(|t| !t.is_empty());
        let target = tokens.next().filter(|t| !t.is_empty());
        let (source, target) = match (source, target) {
            (Some(s), Some(t)) => (s, t),
            _ => {
                return Err(HbseError::validation(format!(
                    "line {} contained fewer than 2 tokens; expected at least a sourceId and a targetId: '{}'",
                    line_num + 1,
                    line
                )));
            }
        };
        // A third token (edge value) may be present; HBSE ignores it.

        let source = parse_id(source, line_num)?;
        let target = parse_id(target, line_num)?;

        for id in [source, target] {
            if id >= vertex_count {
                return Err(HbseError::validation(format!(
                    "vertex id {} at line {} out of range [0, {})",
                    id,
                    line_num + 1,
                    vertex_count
                )));
            }
        }

        if source == target {
            log::warn!("Skipping self-loop edge ({}, {}) at line {}", source, target, line_num + 1);
            continue;
        }

        graph.add_edge(source, target);
        if options.reverse_duplicate {
            graph.add_edge(target, source);
        }
    }

    log::info!(
        "Loaded edge list '{}': {} vertices, {} directed edges",
        path_ref.display(),
        graph.num_vertices,
        graph.num_edges
    );
    Ok(graph)
}

fn parse_id(token: &str, line_num: usize) -> Result<usize> {
    token.parse().map_err(|_| {
        HbseError::validation(format!(
            "invalid vertex id '{}' at line {}: must be a non-negative integer",
            token,
            line_num + 1
        ))
    })
}
