//! Simulation runner
//!
//! Replays one trace through every configured policy in a single streaming
//! pass: each request is read once and handed to each cache in turn, so all
//! runs see the identical request sequence. Every cache has the same byte
//! capacity.
//!
//! With `verify_every > 0` each cache runs its consistency walk after every
//! `verify_every` requests and once more at the end. A failed walk stops the
//! simulation with [`SimulatorError::Verify`].

use std::time::{Duration, Instant};

use ahash::AHashSet;
use sieve_size::config::CacheConfig;
use sieve_size::metrics::CacheMetrics;
use sieve_size::Cache;

use crate::error::{Result, SimulatorError};
use crate::input::LogReader;
use crate::models::{
    AlgorithmStats, LatencyPercentiles, OpLatencyStats, PolicyRun, SimulationConfig,
    SimulationResult,
};

const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Tracks latency for a single operation type
#[derive(Debug)]
struct OpLatencyTracker {
    total_ns: u64,
    count: u64,
    min_ns: u64,
    max_ns: u64,
    /// Sample reservoir for percentile calculation
    samples: Vec<u64>,
    max_samples: usize,
}

impl OpLatencyTracker {
    fn new() -> Self {
        Self {
            total_ns: 0,
            count: 0,
            min_ns: u64::MAX,
            max_ns: 0,
            samples: Vec::with_capacity(5000),
            max_samples: 5000,
        }
    }

    #[inline]
    fn record(&mut self, latency_ns: u64) {
        self.total_ns += latency_ns;
        self.count += 1;
        self.min_ns = self.min_ns.min(latency_ns);
        self.max_ns = self.max_ns.max(latency_ns);

        // Reservoir sampling (algorithm R)
        if self.samples.len() < self.max_samples {
            self.samples.push(latency_ns);
        } else {
            let slot = rand::random::<u64>() % self.count;
            if let Some(sample) = usize::try_from(slot)
                .ok()
                .and_then(|slot| self.samples.get_mut(slot))
            {
                *sample = latency_ns;
            }
        }
    }

    fn percentiles(&mut self) -> Option<LatencyPercentiles> {
        if self.samples.is_empty() {
            return None;
        }

        self.samples.sort_unstable();
        let len = self.samples.len();
        let at = |pct: usize| self.samples[(len * pct / 1000).min(len - 1)];

        Some(LatencyPercentiles {
            p50_ns: at(500),
            p90_ns: at(900),
            p99_ns: at(990),
            p999_ns: at(999),
        })
    }

    fn finalize(&mut self) -> OpLatencyStats {
        OpLatencyStats {
            total_ns: self.total_ns,
            count: self.count,
            min_ns: if self.min_ns == u64::MAX {
                0
            } else {
                self.min_ns
            },
            max_ns: self.max_ns,
            percentiles: self.percentiles(),
        }
    }
}

/// A cache being driven by the runner, plus its bookkeeping.
#[derive(Debug)]
struct Lane {
    run: PolicyRun,
    cache: Cache,
    latency: OpLatencyTracker,
    verifications: u64,
}

impl Lane {
    fn new(run: PolicyRun, config: &SimulationConfig) -> Self {
        let cache_config = CacheConfig::new(config.cache_size).with_policy(run.policy);
        Self {
            run,
            cache: Cache::init(cache_config),
            latency: OpLatencyTracker::new(),
            verifications: 0,
        }
    }

    fn verify(&mut self, requests: u64) -> Result<()> {
        self.verifications += 1;
        self.cache.verify().map_err(|source| SimulatorError::Verify {
            policy: self.run.to_string(),
            requests,
            source,
        })
    }

    fn finish(mut self) -> AlgorithmStats {
        let core = self.cache.core_metrics();
        let metrics = self.cache.metrics();
        let policy_counter = |key: &str| metrics.get(key).map_or(0, |v| *v as u64);

        AlgorithmStats {
            hits: core.cache_hits,
            misses: core.requests - core.cache_hits,
            bytes_hit: core.bytes_served_from_cache,
            bytes_miss: core.total_bytes_requested - core.bytes_served_from_cache,
            evictions: core.evictions,
            size_driven_evictions: policy_counter("sieve_size_size_driven_evictions"),
            aging_steps: policy_counter("sieve_size_aging_steps"),
            final_objects: self.cache.n_obj(),
            final_bytes: self.cache.occupied_bytes(),
            verifications: self.verifications,
            latency: self.latency.finalize(),
            ..AlgorithmStats::new(&self.run)
        }
    }
}

/// Runner for cache simulations
#[derive(Debug)]
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replays the trace through every configured policy.
    pub fn run(&self) -> Result<SimulationResult> {
        let log_reader = LogReader::new(&self.config.input_dir);
        let verify_every = self.config.verify_every;

        let mut lanes: Vec<Lane> = self
            .config
            .runs
            .iter()
            .map(|&run| Lane::new(run, &self.config))
            .collect();

        tracing::info!(
            input = %self.config.input_dir.display(),
            cache_size = self.config.cache_size.get(),
            policies = lanes.len(),
            verify_every,
            "starting simulation"
        );

        let start = Instant::now();
        let mut total_requests: u64 = 0;
        let mut total_bytes: u64 = 0;
        let mut unique_objects: AHashSet<u64> = AHashSet::new();

        for record in log_reader.stream_requests()? {
            let request = record?.request();
            total_requests += 1;
            total_bytes += request.size;
            unique_objects.insert(request.id);

            for lane in &mut lanes {
                let op_start = Instant::now();
                lane.cache.get(&request);
                lane.latency.record(elapsed_ns(op_start.elapsed()));

                if verify_every > 0 && total_requests % verify_every == 0 {
                    lane.verify(total_requests)?;
                }
            }

            if total_requests % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "replayed {} million requests",
                    total_requests / PROGRESS_INTERVAL
                );
            }
        }

        if total_requests == 0 {
            return Err(SimulatorError::EmptyTrace(self.config.input_dir.clone()));
        }

        if verify_every > 0 {
            for lane in &mut lanes {
                lane.verify(total_requests)?;
            }
        }

        let duration = start.elapsed();
        tracing::info!(
            requests = total_requests,
            unique_objects = unique_objects.len(),
            elapsed = ?duration,
            "simulation complete"
        );

        Ok(SimulationResult {
            stats: lanes.into_iter().map(Lane::finish).collect(),
            total_requests,
            total_bytes,
            unique_objects: unique_objects.len(),
            duration,
            cache_size: self.config.cache_size.get(),
        })
    }
}

#[inline]
fn elapsed_ns(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}
