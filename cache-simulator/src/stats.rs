// Reporting for simulation results

use crate::error::Result;
use crate::models::{AlgorithmStats, CsvResultRow, SimulationResult};
use std::io::Write;
use std::path::Path;

/// Formats and exports the results of a simulation
#[derive(Debug)]
pub struct SimulationStats<'a> {
    result: &'a SimulationResult,
}

impl<'a> SimulationStats<'a> {
    pub fn from_result(result: &'a SimulationResult) -> Self {
        Self { result }
    }

    /// The run with the best byte hit rate, first one on ties.
    pub fn best_byte_hit_rate(&self) -> Option<&'a AlgorithmStats> {
        self.result.stats.iter().reduce(|best, stats| {
            if stats.byte_hit_rate() > best.byte_hit_rate() {
                stats
            } else {
                best
            }
        })
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout is not worth failing the run over.
        let _ = self.write_summary(&mut stdout);
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let result = self.result;

        writeln!(out, "\nCache Simulation Summary")?;
        writeln!(out, "========================")?;
        writeln!(out, "Total requests: {}", result.total_requests)?;
        writeln!(
            out,
            "Total bytes: {} ({:.2} MB)",
            result.total_bytes,
            result.total_bytes as f64 / (1024.0 * 1024.0)
        )?;
        writeln!(out, "Unique objects: {}", result.unique_objects)?;
        writeln!(
            out,
            "Cache size: {} bytes ({:.2} MB)",
            result.cache_size,
            result.cache_size as f64 / (1024.0 * 1024.0)
        )?;
        writeln!(out, "Elapsed: {:.2?}", result.duration)?;

        writeln!(out, "\nResults by Policy:")?;
        writeln!(
            out,
            "{:<20} {:>8} {:>10} {:>10} {:>10} {:>12} {:>9} {:>9}",
            "Policy", "HitRate", "ByteHit%", "Evictions", "SizeEvict", "AgingSteps", "GetAvg", "p99"
        )?;
        writeln!(out, "{}", "-".repeat(96))?;

        for stats in &result.stats {
            writeln!(
                out,
                "{:<20} {:>7.2}% {:>9.2}% {:>10} {:>10} {:>12} {:>7.0}ns {:>7}ns",
                stats.label,
                stats.hit_rate(),
                stats.byte_hit_rate(),
                stats.evictions,
                stats.size_driven_evictions,
                stats.aging_steps,
                stats.latency.avg_ns(),
                stats.latency.p99_ns(),
            )?;
        }

        if let Some(best) = self.best_byte_hit_rate() {
            writeln!(
                out,
                "\nBest byte hit rate: {} ({:.2}%)",
                best.label,
                best.byte_hit_rate()
            )?;
        }
        Ok(())
    }

    /// Export results to a CSV file, one row per run
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for stats in &self.result.stats {
            writer.serialize(CsvResultRow::new(stats, self.result.cache_size))?;
        }
        writer
            .flush()
            .map_err(|e| crate::error::SimulatorError::io(path, e))?;
        tracing::info!(path = %path.display(), rows = self.result.stats.len(), "exported results");
        Ok(())
    }
}
