use cache_simulator::generator::{TrafficLogConfig, TrafficLogGenerator};
use cache_simulator::models::{PolicyRun, SimulationConfig, ALL_ALGORITHMS};
use cache_simulator::runner::SimulationRunner;
use cache_simulator::stats::SimulationStats;
use clap::{Parser, Subcommand};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Cache eviction policy simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay traces through one or more policies
    Simulate {
        /// Directory containing trace files; a small sample trace is
        /// generated into `test_data` when omitted
        #[arg(short, long, value_name = "DIR")]
        input_dir: Option<PathBuf>,

        /// Cache size in bytes
        #[arg(short, long, default_value = "104857600")]
        cache_size: NonZeroU64,

        /// Policies to simulate (fifo, sieve, sieve-size[:eviction-window-size=N])
        #[arg(short, long, value_name = "POLICIES", num_args = 1.., value_delimiter = ',')]
        algorithms: Option<Vec<String>>,

        /// Window sizes to try for a bare `sieve-size`
        #[arg(short, long, value_name = "SIZES", num_args = 1.., value_delimiter = ',', default_value = "100")]
        window_sizes: Vec<usize>,

        /// Export results to CSV file
        #[arg(long, value_name = "PATH")]
        output_csv: Option<PathBuf>,

        /// Verify every cache after this many requests (0 disables)
        #[arg(long, default_value = "0")]
        verify_every: u64,
    },

    /// Generate synthetic traffic logs, one file per hour
    Generate {
        /// Requests per second
        #[arg(long, default_value = "100")]
        rps: u32,

        /// Duration in hours
        #[arg(long, default_value = "24")]
        hours: u32,

        /// Number of unique objects
        #[arg(long, default_value = "10000")]
        objects: u32,

        /// Percentage of traffic from popular objects
        #[arg(long, default_value = "80")]
        popular_traffic: u8,

        /// Percentage of objects that are popular
        #[arg(long, default_value = "20")]
        popular_objects: u8,

        /// Minimum object size in KB
        #[arg(long, default_value = "1")]
        min_size: u64,

        /// Maximum object size in KB
        #[arg(long, default_value = "10240")]
        max_size: u64,

        /// Minimum TTL in hours
        #[arg(long, default_value = "1")]
        min_ttl: u64,

        /// Maximum TTL in hours
        #[arg(long, default_value = "24")]
        max_ttl: u64,

        /// Output directory
        #[arg(short, long, default_value = "traffic_logs")]
        output_dir: PathBuf,

        /// Write buffer size in KB
        #[arg(long, default_value = "8192")]
        buffer_size: u32,

        /// RNG seed for reproducible traces
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    match args.command {
        Commands::Generate {
            rps,
            hours,
            objects,
            popular_traffic,
            popular_objects,
            min_size,
            max_size,
            min_ttl,
            max_ttl,
            output_dir,
            buffer_size,
            seed,
        } => {
            let config = TrafficLogConfig {
                rps,
                duration_hours: hours,
                unique_objects: objects,
                popular_traffic_percent: popular_traffic,
                popular_objects_percent: popular_objects,
                min_size: min_size * 1024,
                max_size: max_size * 1024,
                min_ttl: min_ttl * 3600,
                max_ttl: max_ttl * 3600,
                output_dir,
                buffer_size_kb: buffer_size,
                seed,
            };
            TrafficLogGenerator::new(config).generate()?;
        }
        Commands::Simulate {
            input_dir,
            cache_size,
            algorithms,
            window_sizes,
            output_csv,
            verify_every,
        } => {
            let input_dir = match input_dir {
                Some(dir) => dir,
                None => ensure_test_data()?,
            };
            let algorithms = algorithms
                .filter(|names| !names.is_empty())
                .unwrap_or_else(|| ALL_ALGORITHMS.iter().map(|s| s.to_string()).collect());

            let config = SimulationConfig {
                input_dir,
                cache_size,
                runs: PolicyRun::expand(&algorithms, &window_sizes)?,
                verify_every,
            };
            run_simulation(config, output_csv.as_deref())?;
        }
    }

    Ok(())
}

fn run_simulation(
    config: SimulationConfig,
    output_csv: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Cache Simulation");
    println!("================");
    println!("Input directory: {}", config.input_dir.display());
    println!(
        "Cache size: {} bytes ({:.2} MB)",
        config.cache_size,
        config.cache_size.get() as f64 / 1_048_576.0
    );
    println!(
        "Policies: {}",
        config
            .runs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let result = SimulationRunner::new(config).run().inspect_err(|e| {
        tracing::error!("simulation failed: {e}");
    })?;

    let stats = SimulationStats::from_result(&result);
    stats.print_summary();

    if let Some(csv_path) = output_csv {
        stats.export_csv(csv_path)?;
        println!("\nResults exported to: {}", csv_path.display());
    }
    Ok(())
}

/// Generates a small, seeded one-hour sample trace unless one already exists.
fn ensure_test_data() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let test_dir = PathBuf::from("test_data");
    if TrafficLogGenerator::hour_file(&test_dir, 0).exists() {
        return Ok(test_dir);
    }

    tracing::info!(dir = %test_dir.display(), "no input directory given, generating sample trace");
    let config = TrafficLogConfig {
        rps: 10,
        duration_hours: 1,
        unique_objects: 5_000,
        min_size: 1024,
        max_size: 256 * 1024,
        output_dir: test_dir.clone(),
        seed: Some(42),
        ..TrafficLogConfig::default()
    };
    TrafficLogGenerator::new(config).generate()?;
    Ok(test_dir)
}
