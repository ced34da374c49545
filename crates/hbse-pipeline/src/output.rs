//! Durable result persistence.
//!
//! The run's product is the persisted result, so every failure here is
//! fatal: a write that silently fails would discard the whole computation.

use hbse_core::errors::{HbseError, Result};
use hbse_core::types::{RunStats, VertexId};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Final high-betweenness set, one id per line.
pub const FINAL_SET_CSV: &str = "final_set.csv";
/// Run statistics, `key: value` lines.
pub const STATS_CSV: &str = "stats.csv";

/// Sink for the final vertex set and run statistics.
pub trait ResultSink {
    fn write_final_set(&mut self, set: &[VertexId]) -> Result<()>;
    fn write_stats(&mut self, stats: &RunStats) -> Result<()>;
}

/// Writes the result files into a local output directory.
pub struct CsvResultSink {
    output_dir: PathBuf,
}

impl CsvResultSink {
    /// Creates the sink, creating the output directory if needed.
    ///
    /// An unusable output location fails here, before any round runs.
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).map_err(|e| {
            HbseError::config(format!(
                "betweenness.output.dir '{}' is not usable: {}",
                output_dir.display(),
                e
            ))
        })?;
        Ok(Self { output_dir })
    }

    fn create(&self, filename: &str) -> Result<BufWriter<File>> {
        let path = self.output_dir.join(filename);
        let file = File::create(&path).map_err(|e| {
            HbseError::internal(format!("could not open file {}: {}", path.display(), e))
        })?;
        Ok(BufWriter::new(file))
    }

    fn flush(mut writer: BufWriter<File>, filename: &str) -> Result<()> {
        writer.flush().map_err(|e| {
            HbseError::internal(format!("could not write to file {}: {}", filename, e))
        })
    }
}

impl ResultSink for CsvResultSink {
    fn write_final_set(&mut self, set: &[VertexId]) -> Result<()> {
        let mut writer = self.create(FINAL_SET_CSV)?;
        for id in set {
            writeln!(writer, "{}", id).map_err(|e| {
                HbseError::internal(format!("could not write to file {}: {}", FINAL_SET_CSV, e))
            })?;
        }
        Self::flush(writer, FINAL_SET_CSV)?;
        log::info!(
            "Wrote {} high-betweenness ids to {}",
            set.len(),
            self.output_dir.join(FINAL_SET_CSV).display()
        );
        Ok(())
    }

    fn write_stats(&mut self, stats: &RunStats) -> Result<()> {
        let mut writer = self.create(STATS_CSV)?;
        let write = |w: &mut BufWriter<File>, line: String| -> Result<()> {
            writeln!(w, "{}", line).map_err(|e| {
                HbseError::internal(format!("could not write to file {}: {}", STATS_CSV, e))
            })
        };
        write(&mut writer, format!("k: {}", stats.set_size))?;
        write(&mut writer, format!("delta p: {}", stats.batch_size))?;
        write(&mut writer, format!("cutoff: {}", stats.stability_cutoff))?;
        write(&mut writer, format!("counter: {}", stats.stability_counter_target))?;
        write(&mut writer, format!("pivots selected: {}", stats.pivots_selected))?;
        write(
            &mut writer,
            format!("percent of graph selected: {}", stats.fraction_sampled),
        )?;
        write(&mut writer, format!("supersteps: {}", stats.supersteps))?;
        write(&mut writer, format!("cycles: {}", stats.cycles))?;
        write(&mut writer, format!("run time: {}", stats.runtime_seconds))?;
        Self::flush(writer, STATS_CSV)?;
        log::info!(
            "Wrote run statistics to {}",
            self.output_dir.join(STATS_CSV).display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_stats() -> RunStats {
        RunStats {
            set_size: 3,
            batch_size: 5,
            stability_cutoff: 0,
            stability_counter_target: 3,
            pivots_selected: 5,
            fraction_sampled: 1.0,
            supersteps: 17,
            cycles: 1,
            runtime_seconds: 2,
        }
    }

    #[test]
    fn final_set_round_trips() {
        let dir = tempdir().unwrap();
        let mut sink = CsvResultSink::new(dir.path()).unwrap();
        sink.write_final_set(&[1, 2, 3]).unwrap();

        let contents = std::fs::read_to_string(dir.path().join(FINAL_SET_CSV)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["1", "2", "3"]);
    }

    #[test]
    fn stats_format_matches_contract() {
        let dir = tempdir().unwrap();
        let mut sink = CsvResultSink::new(dir.path()).unwrap();
        sink.write_stats(&sample_stats()).unwrap();

        let contents = std::fs::read_to_string(dir.path().join(STATS_CSV)).unwrap();
        assert!(contents.contains("k: 3"));
        assert!(contents.contains("delta p: 5"));
        assert!(contents.contains("cutoff: 0"));
        assert!(contents.contains("counter: 3"));
        assert!(contents.contains("pivots selected: 5"));
        assert!(contents.contains("percent of graph selected: 1"));
        assert!(contents.contains("supersteps: 17"));
        assert!(contents.contains("cycles: 1"));
        assert!(contents.contains("run time: 2"));
    }

    #[test]
    fn unusable_output_dir_fails_at_construction() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        // A path through a regular file cannot become a directory.
        let result = CsvResultSink::new(blocker.join("nested"));
        assert!(matches!(result, Err(HbseError::ConfigError(_))));
    }

    #[test]
    fn nested_output_dir_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut sink = CsvResultSink::new(&nested).unwrap();
        sink.write_final_set(&[0]).unwrap();
        assert!(nested.join(FINAL_SET_CSV).exists());
    }
}
