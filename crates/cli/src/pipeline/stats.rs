//! Pipeline run statistics.

use std::collections::BTreeMap;
use std::time::Duration;

use dispatch::EngineMetricsSnapshot;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Lines read from the input stream
    pub lines: u64,

    /// Batches delivered to consumers
    pub batches: u64,

    /// Commands delivered inside those batches
    pub commands: u64,

    /// Commands discarded by the unterminated-group policy
    pub discarded: u64,

    /// Number of subscribed consumers
    pub consumers: usize,

    /// Total duration of the run
    pub duration: Duration,

    /// Final counter values, sorted by name
    pub counters: BTreeMap<String, u64>,

    /// Per-engine metrics, in subscription order
    pub engines: Vec<(String, EngineMetricsSnapshot)>,
}

impl PipelineStats {
    /// Lines per second throughput
    pub fn lines_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.lines as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary to stderr
    ///
    /// Stderr keeps the report out of the console consumer's stdout stream.
    pub fn print_summary(&self) {
        eprintln!("\n=== Run Statistics ===");
        eprintln!("Duration: {:.2}s", self.duration.as_secs_f64());
        eprintln!("Lines read: {}", self.lines);
        eprintln!("Batches delivered: {}", self.batches);
        eprintln!("Commands delivered: {}", self.commands);
        if self.discarded > 0 {
            eprintln!("Commands discarded: {}", self.discarded);
        }
        eprintln!("Consumers: {}", self.consumers);
        eprintln!("Throughput: {:.0} lines/s", self.lines_per_sec());

        if !self.engines.is_empty() {
            eprintln!("\nConsumers:");
            for (name, snapshot) in &self.engines {
                eprintln!(
                    "  {}: enqueued={} processed={} failed={} rejected={}",
                    name, snapshot.enqueued, snapshot.processed, snapshot.failed, snapshot.rejected
                );
            }
        }

        if !self.counters.is_empty() {
            eprintln!("\nCounters:");
            for (name, value) in &self.counters {
                eprintln!("  {}: {}", name, value);
            }
        }

        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        let stats = PipelineStats {
            lines: 500,
            duration: Duration::from_secs(2),
            ..Default::default()
        };
        assert!((stats.lines_per_sec() - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_throughput_zero_duration() {
        let stats = PipelineStats::default();
        assert_eq!(stats.lines_per_sec(), 0.0);
    }
}
