//! Optional per-cycle flight recorder.
//!
//! One JSONL record per completed cycle plus a final `run_complete`
//! record, appended through a buffered writer and flushed immediately so
//! a run can be watched live. Telemetry is best-effort: a writer that
//! cannot be created degrades to a logged warning, never a fatal error.

use chrono::Utc;
use hbse_core::errors::Result;
use hbse_core::types::RunStats;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A single telemetry record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Emitted once per completed cycle.
    Cycle {
        timestamp: String,
        cycle: u64,
        superstep: u64,
        delta: usize,
        stability_counter: u32,
        pivots_selected: usize,
        set_size: usize,
    },
    /// Emitted once, at termination.
    RunComplete {
        timestamp: String,
        stats: RunStats,
    },
}

impl TelemetryEvent {
    pub fn cycle(
        cycle: u64,
        superstep: u64,
        delta: usize,
        stability_counter: u32,
        pivots_selected: usize,
        set_size: usize,
    ) -> Self {
        TelemetryEvent::Cycle {
            timestamp: Utc::now().to_rfc3339(),
            cycle,
            superstep,
            delta,
            stability_counter,
            pivots_selected,
            set_size,
        }
    }

    pub fn run_complete(stats: RunStats) -> Self {
        TelemetryEvent::RunComplete {
            timestamp: Utc::now().to_rfc3339(),
            stats,
        }
    }
}

/// Appends telemetry records as JSONL.
pub struct TelemetryWriter {
    writer: BufWriter<std::fs::File>,
}

impl TelemetryWriter {
    /// Opens (or creates) the telemetry file in append mode.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        log::info!("Telemetry writer created: {}", path.as_ref().display());
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes one record and flushes for real-time monitoring.
    pub fn write_event(&mut self, event: &TelemetryEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_append_as_parseable_jsonl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("telemetry.jsonl");
        let mut writer = TelemetryWriter::create(&path).unwrap();

        writer
            .write_event(&TelemetryEvent::cycle(1, 9, 3, 0, 5, 3))
            .unwrap();
        writer
            .write_event(&TelemetryEvent::run_complete(RunStats {
                set_size: 3,
                batch_size: 5,
                stability_cutoff: 0,
                stability_counter_target: 3,
                pivots_selected: 5,
                fraction_sampled: 1.0,
                supersteps: 12,
                cycles: 1,
                runtime_seconds: 0,
            }))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: TelemetryEvent = serde_json::from_str(lines[0]).unwrap();
        match first {
            TelemetryEvent::Cycle { cycle, delta, .. } => {
                assert_eq!(cycle, 1);
                assert_eq!(delta, 3);
            }
            other => panic!("expected cycle record, got {:?}", other),
        }

        let second: TelemetryEvent = serde_json::from_str(lines[1]).unwrap();
        assert!(matches!(second, TelemetryEvent::RunComplete { .. }));
    }
}
