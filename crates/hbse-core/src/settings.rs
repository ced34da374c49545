//! Run configuration: the flat key-value settings blob and the typed,
//! validated configuration it materializes into.
//!
//! Required keys fail fast at startup with an error naming the offending
//! key. Optional keys that are present but unparseable log an error and
//! fall back to their default; required keys never fall back.

use crate::errors::{HbseError, Result};
use crate::types::VertexId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Directory the result files are written to.
pub const OUTPUT_DIR: &str = "betweenness.output.dir";
/// Number of vertices loaded; valid ids are `[0, vertex.count)`.
pub const VERTEX_COUNT: &str = "vertex.count";
/// Number of pivots per batch.
pub const PIVOT_BATCH_SIZE: &str = "pivot.batch.size";
/// Number of pivots in the first batch (defaults to the batch size).
pub const PIVOT_BATCH_SIZE_INITIAL: &str = "pivot.batch.size.initial";
/// Maximum size of the high-betweenness set.
pub const SET_MAX_SIZE: &str = "betweenness.set.maxSize";
/// Stability cutoff checked after each cycle.
pub const SET_STABILITY: &str = "betweenness.set.stability";
/// Number of consecutive stable cycles required to converge.
pub const SET_STABILITY_COUNTER: &str = "betweenness.set.stability.counter";
/// Shortest-path phases to run per dependency-accumulation phase.
pub const SHORTEST_PATH_PHASES: &str = "betweenness.shortest.path.phases";
/// Seed for pivot selection; absent means a non-deterministic source.
pub const PIVOT_RANDOM_SEED: &str = "pivot.batch.random.seed";
/// Manually supplied first pivot batch, comma separated.
pub const PIVOT_BATCH_STRING: &str = "pivot.batch.string";
/// Optional JSONL cycle telemetry path; absent disables telemetry.
pub const TELEMETRY_PATH: &str = "telemetry.path";
/// Safety valve on total rounds; exceeding it aborts the run.
pub const MAX_SUPERSTEPS: &str = "max.supersteps";

const PIVOT_BATCH_DELIMITER: char = ',';
const DEFAULT_STABILITY_CUTOFF: usize = 0;
const DEFAULT_STABILITY_COUNTER: u32 = 3;
const DEFAULT_SHORTEST_PATH_PHASES: u32 = 1;
const DEFAULT_MAX_SUPERSTEPS: u64 = 1_000_000;

/// Flat string key-value settings blob.
///
/// Sources: a properties-style file (`key=value` lines, `#` comments)
/// and/or explicit `key=value` pairs from the command line, later entries
/// overriding earlier ones.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a properties-style file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|e| {
            HbseError::config(format!(
                "failed to open settings file '{}': {}",
                path_ref.display(),
                e
            ))
        })?;

        let mut settings = Self::new();
        for (line_num, line_result) in BufReader::new(file).lines().enumerate() {
            let line = line_result.map_err(|e| {
                HbseError::config(format!(
                    "failed to read settings file '{}' line {}: {}",
                    path_ref.display(),
                    line_num + 1,
                    e
                ))
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => {
                    settings.set(key.trim(), value.trim());
                }
                None => {
                    return Err(HbseError::config(format!(
                        "settings file '{}' line {}: expected key=value, got '{}'",
                        path_ref.display(),
                        line_num + 1,
                        line
                    )));
                }
            }
        }
        Ok(settings)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Required string value; missing or empty is a fatal error naming the key.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(HbseError::config(format!("{} must be set", key))),
        }
    }

    /// Required integer value; missing or unparseable is a fatal error
    /// naming the key and the rejected value.
    pub fn require_usize(&self, key: &str) -> Result<usize> {
        let raw = self.get(key);
        raw.and_then(|value| value.parse().ok()).ok_or_else(|| {
            HbseError::config(format!(
                "option not set or invalid: \"{}\" must be a valid int, was: {}",
                key,
                raw.unwrap_or("<unset>")
            ))
        })
    }

    /// Optional integer with a default. Present-but-invalid values log an
    /// error and fall back; absent values fall back silently.
    pub fn optional_usize(&self, key: &str, default: usize) -> usize {
        self.optional_parsed(key, default)
    }

    /// Optional `u32` with a default (same fallback policy).
    pub fn optional_u32(&self, key: &str, default: u32) -> u32 {
        self.optional_parsed(key, default)
    }

    /// Optional `u64` with a default (same fallback policy).
    pub fn optional_u64(&self, key: &str, default: u64) -> u64 {
        self.optional_parsed(key, default)
    }

    /// Optional value that must parse when present. Unlike the
    /// defaulted getters, a present-but-invalid value here is fatal: a
    /// mistyped seed silently ignored would unknowingly lose
    /// reproducibility.
    pub fn strict_optional_u64(&self, key: &str) -> Result<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                HbseError::config(format!(
                    "option invalid: \"{}\" must be a valid int, was: {}",
                    key, raw
                ))
            }),
        }
    }

    fn optional_parsed<T: std::str::FromStr + std::fmt::Display>(
        &self,
        key: &str,
        default: T,
    ) -> T {
        match self.get(key) {
            None => default,
            Some(raw) => match raw.parse() {
                Ok(value) => value,
                Err(_) => {
                    log::error!(
                        "Option invalid: \"{}\" must be a valid int, was: {}. Using default {}",
                        key,
                        raw,
                        default
                    );
                    default
                }
            },
        }
    }
}

/// Immutable per-run configuration, materialized once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HbseConfig {
    /// Directory the result files are written to
    pub output_dir: PathBuf,

    /// Number of vertices (N); valid ids are `[0, N)`
    pub vertex_count: usize,

    /// Pivots per batch
    pub batch_size: usize,

    /// Pivots in the first batch
    pub initial_batch_size: usize,

    /// Maximum high-betweenness set size
    pub max_high_bc_set_size: usize,

    /// Set stability cutoff (margin of error per cycle)
    pub stability_cutoff: usize,

    /// Consecutive stable cycles required to converge
    pub stability_counter_target: u32,

    /// Shortest-path phases per dependency-accumulation phase
    pub shortest_path_phases: u32,

    /// Pivot selection seed; `None` means non-deterministic
    pub random_seed: Option<u64>,

    /// Manually supplied first pivot batch
    pub initial_pivots: Vec<VertexId>,

    /// Optional JSONL telemetry path
    pub telemetry_path: Option<PathBuf>,

    /// Safety valve on total rounds
    pub max_supersteps: u64,
}

impl HbseConfig {
    /// Reads and validates a configuration from the settings blob.
    ///
    /// Fails fast: every error names the offending key, and no round runs
    /// on a partially valid configuration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let output_dir = PathBuf::from(settings.require_str(OUTPUT_DIR)?);
        let vertex_count = settings.require_usize(VERTEX_COUNT)?;
        let batch_size = settings.require_usize(PIVOT_BATCH_SIZE)?;
        let max_high_bc_set_size = settings.require_usize(SET_MAX_SIZE)?;

        let initial_batch_size = settings.optional_usize(PIVOT_BATCH_SIZE_INITIAL, batch_size);
        let stability_cutoff = settings.optional_usize(SET_STABILITY, DEFAULT_STABILITY_CUTOFF);
        let stability_counter_target =
            settings.optional_u32(SET_STABILITY_COUNTER, DEFAULT_STABILITY_COUNTER);
        let shortest_path_phases =
            settings.optional_u32(SHORTEST_PATH_PHASES, DEFAULT_SHORTEST_PATH_PHASES);
        let random_seed = settings.strict_optional_u64(PIVOT_RANDOM_SEED)?;
        let max_supersteps = settings.optional_u64(MAX_SUPERSTEPS, DEFAULT_MAX_SUPERSTEPS);

        let initial_pivots = match settings.get(PIVOT_BATCH_STRING) {
            None => Vec::new(),
            Some(raw) => parse_pivot_batch(raw)?,
        };

        let telemetry_path = settings.get(TELEMETRY_PATH).map(PathBuf::from);

        let config = Self {
            output_dir,
            vertex_count,
            batch_size,
            initial_batch_size,
            max_high_bc_set_size,
            stability_cutoff,
            stability_counter_target,
            shortest_path_phases,
            random_seed,
            initial_pivots,
            telemetry_path,
            max_supersteps,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.vertex_count == 0 {
            return Err(HbseError::config(format!("{} must be greater than 0", VERTEX_COUNT)));
        }
        if self.batch_size == 0 {
            return Err(HbseError::config(format!(
                "{} must be greater than 0",
                PIVOT_BATCH_SIZE
            )));
        }
        if self.initial_batch_size == 0 {
            return Err(HbseError::config(format!(
                "{} must be greater than 0",
                PIVOT_BATCH_SIZE_INITIAL
            )));
        }
        if self.max_high_bc_set_size == 0 {
            return Err(HbseError::config(format!(
                "{} must be greater than 0",
                SET_MAX_SIZE
            )));
        }
        if self.shortest_path_phases == 0 {
            return Err(HbseError::config(format!(
                "{} must be greater than 0",
                SHORTEST_PATH_PHASES
            )));
        }
        if self.max_supersteps == 0 {
            return Err(HbseError::config(format!(
                "{} must be greater than 0",
                MAX_SUPERSTEPS
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for &pivot in &self.initial_pivots {
            if pivot >= self.vertex_count {
                return Err(HbseError::config(format!(
                    "{}: pivot id {} out of range [0, {})",
                    PIVOT_BATCH_STRING, pivot, self.vertex_count
                )));
            }
            if !seen.insert(pivot) {
                return Err(HbseError::config(format!(
                    "{}: pivot id {} listed more than once",
                    PIVOT_BATCH_STRING, pivot
                )));
            }
        }
        Ok(())
    }
}

fn parse_pivot_batch(raw: &str) -> Result<Vec<VertexId>> {
    raw.split(PIVOT_BATCH_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse().map_err(|_| {
                HbseError::config(format!(
                    "{} invalid: must be a comma separated list of ints, got '{}'",
                    PIVOT_BATCH_STRING, token
                ))
            })
        })
        .collect()
}
