// Data models for cache simulation

use serde::Serialize;
use sieve_size::config::{PolicyConfig, SieveSizeConfig};
use std::fmt;
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SimulatorError};

/// Policy names accepted by `--algorithms` when none are given.
pub const ALL_ALGORITHMS: [&str; 3] = ["fifo", "sieve", "sieve-size"];

/// One policy configuration replayed against the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyRun {
    pub policy: PolicyConfig,
}

impl PolicyRun {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    /// Display name of the policy, e.g. `Sieve_size`.
    pub fn algorithm(&self) -> &'static str {
        match self.policy {
            PolicyConfig::Fifo => "FIFO",
            PolicyConfig::Sieve => "SIEVE",
            PolicyConfig::SieveSize(_) => "Sieve_size",
        }
    }

    /// SIEVE-size window, if this run uses one.
    pub fn window(&self) -> Option<usize> {
        match self.policy {
            PolicyConfig::SieveSize(config) => Some(config.eviction_window_size.get()),
            _ => None,
        }
    }

    /// Expands `--algorithms` and `--window-sizes` into the list of runs.
    ///
    /// A bare `sieve-size` entry produces one run per window size; an entry
    /// carrying its own parameters (`sieve-size:eviction-window-size=8`) is
    /// taken as is. Duplicates are dropped, first occurrence wins.
    pub fn expand(algorithms: &[String], window_sizes: &[usize]) -> Result<Vec<PolicyRun>> {
        let mut runs: Vec<PolicyRun> = Vec::new();
        let mut push = |run: PolicyRun| {
            if !runs.contains(&run) {
                runs.push(run);
            }
        };

        for entry in algorithms {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let has_params = entry.contains(':');
            let policy: PolicyConfig = entry.parse()?;

            match policy {
                PolicyConfig::SieveSize(_) if !has_params => {
                    if window_sizes.is_empty() {
                        return Err(SimulatorError::InvalidArgument(
                            "sieve-size needs at least one window size".to_string(),
                        ));
                    }
                    for &window in window_sizes {
                        let window = NonZeroUsize::new(window)
                            .ok_or(sieve_size::ConfigError::ZeroWindow)?;
                        push(PolicyRun::new(PolicyConfig::SieveSize(
                            SieveSizeConfig::new(window),
                        )));
                    }
                }
                _ => push(PolicyRun::new(policy)),
            }
        }

        if runs.is_empty() {
            return Err(SimulatorError::InvalidArgument(
                "no policies selected".to_string(),
            ));
        }
        Ok(runs)
    }
}

impl fmt::Display for PolicyRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window() {
            Some(window) => write!(f, "{}(W={window})", self.algorithm()),
            None => f.write_str(self.algorithm()),
        }
    }
}

/// Configuration for a simulation
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Directory containing the trace files
    pub input_dir: PathBuf,
    /// Cache size in bytes, shared by every run
    pub cache_size: NonZeroU64,
    /// Policies to replay
    pub runs: Vec<PolicyRun>,
    /// Verify every cache after this many requests; 0 disables
    pub verify_every: u64,
}

/// Results of a simulation
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Per-run statistics, in run order
    pub stats: Vec<AlgorithmStats>,
    /// Number of requests replayed
    pub total_requests: u64,
    /// Bytes requested over the whole trace
    pub total_bytes: u64,
    /// Distinct object ids in the trace
    pub unique_objects: usize,
    /// Wall time of the whole simulation
    pub duration: Duration,
    /// Cache size in bytes
    pub cache_size: u64,
}

/// Statistics for a single run
#[derive(Debug, Clone, Default)]
pub struct AlgorithmStats {
    /// `Display` form of the run, e.g. `Sieve_size(W=100)`
    pub label: String,
    pub algorithm: &'static str,
    pub window: Option<usize>,
    pub hits: u64,
    pub misses: u64,
    /// Bytes served from cache
    pub bytes_hit: u64,
    /// Bytes fetched on misses
    pub bytes_miss: u64,
    pub evictions: u64,
    /// Evictions where the window picked a larger object than the scan stop
    pub size_driven_evictions: u64,
    /// Records examined by the aging scan
    pub aging_steps: u64,
    /// Objects resident at the end
    pub final_objects: u64,
    /// Bytes resident at the end
    pub final_bytes: u64,
    /// Number of `verify` passes that ran
    pub verifications: u64,
    /// Latency of `get` (lookup plus any evictions and insertion)
    pub latency: OpLatencyStats,
}

impl AlgorithmStats {
    pub fn new(run: &PolicyRun) -> Self {
        Self {
            label: run.to_string(),
            algorithm: run.algorithm(),
            window: run.window(),
            ..Self::default()
        }
    }

    /// Hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Byte hit rate as percentage
    pub fn byte_hit_rate(&self) -> f64 {
        let total = self.bytes_hit + self.bytes_miss;
        if total > 0 {
            (self.bytes_hit as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Latency statistics for one operation type
#[derive(Debug, Clone, Default)]
pub struct OpLatencyStats {
    /// Total time spent (nanoseconds)
    pub total_ns: u64,
    /// Number of operations
    pub count: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub percentiles: Option<LatencyPercentiles>,
}

impl OpLatencyStats {
    /// Average latency in nanoseconds
    pub fn avg_ns(&self) -> f64 {
        if self.count > 0 {
            self.total_ns as f64 / self.count as f64
        } else {
            0.0
        }
    }

    /// Throughput in operations per second
    pub fn ops_per_sec(&self) -> f64 {
        if self.total_ns > 0 {
            (self.count as f64 * 1_000_000_000.0) / self.total_ns as f64
        } else {
            0.0
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_ns as f64 / 1_000_000_000.0
    }

    pub fn p50_ns(&self) -> u64 {
        self.percentiles.as_ref().map_or(0, |p| p.p50_ns)
    }

    pub fn p99_ns(&self) -> u64 {
        self.percentiles.as_ref().map_or(0, |p| p.p99_ns)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencyPercentiles {
    pub p50_ns: u64,
    pub p90_ns: u64,
    pub p99_ns: u64,
    pub p999_ns: u64,
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub policy: String,
    pub algorithm: String,
    pub eviction_window_size: Option<usize>,
    pub cache_size: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub byte_hit_rate: f64,
    pub bytes_hit: u64,
    pub bytes_miss: u64,
    pub evictions: u64,
    pub size_driven_evictions: u64,
    pub aging_steps: u64,
    pub final_objects: u64,
    pub final_bytes: u64,
    pub get_ops: u64,
    pub get_duration_ns: u64,
    pub get_ops_per_sec: f64,
    pub get_avg_ns: f64,
    pub get_min_ns: u64,
    pub get_max_ns: u64,
    pub get_p50_ns: u64,
    pub get_p99_ns: u64,
}

impl CsvResultRow {
    pub fn new(stats: &AlgorithmStats, cache_size: u64) -> Self {
        Self {
            policy: stats.label.clone(),
            algorithm: stats.algorithm.to_string(),
            eviction_window_size: stats.window,
            cache_size,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            byte_hit_rate: stats.byte_hit_rate(),
            bytes_hit: stats.bytes_hit,
            bytes_miss: stats.bytes_miss,
            evictions: stats.evictions,
            size_driven_evictions: stats.size_driven_evictions,
            aging_steps: stats.aging_steps,
            final_objects: stats.final_objects,
            final_bytes: stats.final_bytes,
            get_ops: stats.latency.count,
            get_duration_ns: stats.latency.total_ns,
            get_ops_per_sec: stats.latency.ops_per_sec(),
            get_avg_ns: stats.latency.avg_ns(),
            get_min_ns: stats.latency.min_ns,
            get_max_ns: stats.latency.max_ns,
            get_p50_ns: stats.latency.p50_ns(),
            get_p99_ns: stats.latency.p99_ns(),
        }
    }
}
