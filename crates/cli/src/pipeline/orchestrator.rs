//! Pipeline orchestrator - wires the batcher to the consumer engines.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use batcher::Batcher;
use contracts::{CounterSink, PipelineBlueprint, SystemClock};
use dispatch::{create_consumer_engine, SubscriberRegistry};
use observability::{FanoutCounters, MemoryCounters, MetricsCounters};
use tokio::io::BufReader;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The pipeline blueprint
    pub blueprint: PipelineBlueprint,

    /// Input file (None = stdin)
    pub input: Option<PathBuf>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Consumes the input stream to its end, waits until every consumer has
    /// processed its backlog, then returns run statistics.
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Counters always accumulate in memory for the final summary; with
        // metrics enabled they are also published through the facade.
        let memory = Arc::new(MemoryCounters::new());
        let counters: Arc<dyn CounterSink> = if self.config.metrics_port.is_some() {
            Arc::new(FanoutCounters::new(vec![
                Arc::clone(&memory) as Arc<dyn CounterSink>,
                Arc::new(MetricsCounters),
            ]))
        } else {
            Arc::clone(&memory) as Arc<dyn CounterSink>
        };

        info!("Setting up consumers...");
        let mut registry = SubscriberRegistry::new();
        for consumer in &blueprint.consumers {
            let engine = create_consumer_engine(consumer, Arc::clone(&counters))
                .with_context(|| format!("Failed to create consumer '{}'", consumer.name))?;
            registry.subscribe(engine);
        }

        if registry.is_empty() {
            warn!("No consumers configured - batches will be dropped");
        }

        info!(consumers = registry.len(), "Consumers started");

        let batcher = Batcher::new(
            SystemClock,
            blueprint.batch.clone(),
            Arc::clone(&counters),
        );

        let read_stats = match &self.config.input {
            Some(path) => {
                info!(input = %path.display(), "Reading commands from file");
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open input file {}", path.display()))?;
                batcher.read(BufReader::new(file), &registry).await?
            }
            None => {
                info!("Reading commands from stdin");
                batcher.read(BufReader::new(tokio::io::stdin()), &registry).await?
            }
        };

        info!("Input exhausted, draining consumers...");
        registry
            .shutdown()
            .await
            .context("Failed to shut down consumers")?;

        let engines = registry
            .engines()
            .iter()
            .map(|e| (e.name().to_string(), e.metrics().snapshot()))
            .collect();

        let stats = PipelineStats {
            lines: read_stats.lines,
            batches: read_stats.batches,
            commands: read_stats.commands,
            discarded: read_stats.discarded,
            consumers: registry.len(),
            duration: start_time.elapsed(),
            counters: memory.snapshot(),
            engines,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
