//! Synthetic trace generation
//!
//! Writes one `traffic_hour_NN.csv` file per simulated hour in the
//! `timestamp,key,size,ttl` format read by [`crate::input::LogReader`].
//! A share of the requests goes to a small set of popular objects ranked by a
//! Zipf-like law; the rest is spread uniformly over the remaining objects.
//! Popularity drifts from hour to hour by rotating which objects hold the top
//! ranks.
//!
//! Each object keeps one size, drawn uniformly from `[min_size, max_size]`,
//! for the whole trace. With a seed, output is fully reproducible.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SimulatorError};

/// Zipf exponent for the popular set
const ZIPF_S: f64 = 0.9;

/// Parameters for generating synthetic traffic
#[derive(Debug, Clone)]
pub struct TrafficLogConfig {
    /// Requests per second
    pub rps: u32,
    /// Total duration in hours
    pub duration_hours: u32,
    /// Number of unique objects
    pub unique_objects: u32,
    /// Percentage of traffic going to popular objects
    pub popular_traffic_percent: u8,
    /// Percentage of objects considered popular
    pub popular_objects_percent: u8,
    /// Minimum object size in bytes
    pub min_size: u64,
    /// Maximum object size in bytes
    pub max_size: u64,
    /// Minimum TTL in seconds
    pub min_ttl: u64,
    /// Maximum TTL in seconds
    pub max_ttl: u64,
    pub output_dir: PathBuf,
    /// Write buffer size in KB
    pub buffer_size_kb: u32,
    /// RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for TrafficLogConfig {
    fn default() -> Self {
        Self {
            rps: 100,
            duration_hours: 24,
            unique_objects: 10_000,
            popular_traffic_percent: 80,
            popular_objects_percent: 20,
            min_size: 1024,        // 1KB
            max_size: 1024 * 1024, // 1MB
            min_ttl: 3600,
            max_ttl: 86400,
            output_dir: PathBuf::from("traffic_logs"),
            buffer_size_kb: 8192,
            seed: None,
        }
    }
}

impl TrafficLogConfig {
    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SimulatorError::InvalidArgument(msg));
        if self.unique_objects == 0 {
            return invalid("unique objects must be at least 1".to_string());
        }
        if self.popular_traffic_percent > 100 || self.popular_objects_percent > 100 {
            return invalid("percentages must be within 0..=100".to_string());
        }
        if self.min_size == 0 || self.min_size > self.max_size {
            return invalid(format!(
                "size range {}..={} is empty or starts at zero",
                self.min_size, self.max_size
            ));
        }
        if self.min_ttl > self.max_ttl {
            return invalid(format!(
                "ttl range {}..={} is empty",
                self.min_ttl, self.max_ttl
            ));
        }
        Ok(())
    }

    /// Number of popular objects, at least one whenever popular traffic exists.
    fn popular_objects(&self) -> u32 {
        let share = u64::from(self.unique_objects) * u64::from(self.popular_objects_percent) / 100;
        let popular = u32::try_from(share).unwrap_or(self.unique_objects);
        if popular == 0 && self.popular_traffic_percent > 0 {
            1
        } else {
            popular
        }
    }
}

/// Object population shared by every hour
#[derive(Debug)]
struct Population {
    popular: u32,
    regular: u32,
    sizes: Vec<u64>,
    /// Cumulative Zipf weights over popular ranks, normalized to 1.0
    zipf_cdf: Vec<f64>,
}

impl Population {
    fn new(config: &TrafficLogConfig, rng: &mut StdRng) -> Self {
        let popular = config.popular_objects();
        let regular = config.unique_objects - popular;

        let sizes = (0..config.unique_objects)
            .map(|_| rng.gen_range(config.min_size..=config.max_size))
            .collect();

        let mut total = 0.0;
        let mut zipf_cdf: Vec<f64> = (0..popular)
            .map(|rank| {
                total += 1.0 / f64::from(rank + 1).powf(ZIPF_S);
                total
            })
            .collect();
        for weight in &mut zipf_cdf {
            *weight /= total;
        }

        Self {
            popular,
            regular,
            sizes,
            zipf_cdf,
        }
    }

    fn popular_rank(&self, rng: &mut StdRng) -> u32 {
        let u: f64 = rng.gen();
        let rank = self.zipf_cdf.partition_point(|&c| c < u);
        u32::try_from(rank).map_or(0, |rank| rank.min(self.popular.saturating_sub(1)))
    }
}

/// Generator for synthetic traffic logs
#[derive(Debug)]
pub struct TrafficLogGenerator {
    config: TrafficLogConfig,
}

impl TrafficLogGenerator {
    pub fn new(config: TrafficLogConfig) -> Self {
        Self { config }
    }

    pub fn hour_file(output_dir: &Path, hour: u32) -> PathBuf {
        output_dir.join(format!("traffic_hour_{hour:02}.csv"))
    }

    /// Generates every hour file, one thread per hour.
    pub fn generate(&self) -> Result<()> {
        let config = &self.config;
        config.validate()?;
        fs::create_dir_all(&config.output_dir)
            .map_err(|e| SimulatorError::io(&config.output_dir, e))?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());

        let mut rng = StdRng::seed_from_u64(seed);
        let population = Population::new(config, &mut rng);

        tracing::info!(
            rps = config.rps,
            hours = config.duration_hours,
            unique_objects = config.unique_objects,
            popular_objects = population.popular,
            popular_traffic_percent = config.popular_traffic_percent,
            min_size = config.min_size,
            max_size = config.max_size,
            seed,
            output = %config.output_dir.display(),
            "generating traffic"
        );

        thread::scope(|scope| {
            let handles: Vec<_> = (0..config.duration_hours)
                .map(|hour| {
                    let population = &population;
                    scope.spawn(move || {
                        let hour_seed = seed.wrapping_add(u64::from(hour) + 1);
                        Self::generate_hour(config, population, hour, start_time, hour_seed)
                    })
                })
                .collect();

            handles.into_iter().try_for_each(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(SimulatorError::InvalidArgument(
                        "generator thread panicked".to_string(),
                    ))
                })
            })
        })?;

        tracing::info!("traffic generation complete");
        Ok(())
    }

    fn generate_hour(
        config: &TrafficLogConfig,
        population: &Population,
        hour: u32,
        start_time: u64,
        seed: u64,
    ) -> Result<()> {
        let path = Self::hour_file(&config.output_dir, hour);
        let io_err = |e| SimulatorError::io(&path, e);

        let file = File::create(&path).map_err(io_err)?;
        let buffer_size = config.buffer_size_kb as usize * 1024;
        let mut writer = BufWriter::with_capacity(buffer_size.max(4096), file);
        writeln!(writer, "timestamp,key,size,ttl").map_err(io_err)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let requests = u64::from(config.rps) * 3600;
        let popular_probability = f64::from(config.popular_traffic_percent) / 100.0;

        // Rotate the top popular ranks through the popular set over the day.
        let popular_shift = (hour % 12) * (population.popular / 12).max(1);
        let hour_start = start_time + u64::from(hour) * 3600;

        for i in 0..requests {
            let is_popular = population.popular > 0
                && (population.regular == 0 || rng.gen::<f64>() < popular_probability);

            let (key, object) = if is_popular {
                let rank = population.popular_rank(&mut rng);
                let index = (rank + popular_shift) % population.popular;
                (format!("popular_obj_{index}"), index)
            } else {
                let index = rng.gen_range(0..population.regular);
                (format!("regular_obj_{index}"), population.popular + index)
            };
            let size = population.sizes[object as usize];
            let ttl = rng.gen_range(config.min_ttl..=config.max_ttl);
            let timestamp = hour_start + i * 3600 / requests;

            writeln!(writer, "{timestamp},{key},{size},{ttl}").map_err(io_err)?;
        }

        writer.flush().map_err(io_err)?;
        tracing::debug!(hour, requests, file = %path.display(), "hour complete");
        Ok(())
    }
}
