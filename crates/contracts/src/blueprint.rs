//! PipelineBlueprint - declarative pipeline configuration.
//!
//! Loaded from TOML/JSON by `config_loader`, consumed by the CLI to build the
//! batcher and the consumer engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// Batching rules
    #[serde(default)]
    pub batch: BatchConfig,

    /// Consumers to fan batches out to, in subscription order
    #[serde(default)]
    pub consumers: Vec<ConsumerConfig>,
}

/// Batch boundary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Size limit N; a buffer of N commands outside any delimited group is
    /// flushed immediately. 0 disables size-based flushing.
    #[serde(default)]
    pub limit: usize,

    /// Line that opens a delimited group
    #[serde(default = "default_open_marker")]
    pub open_marker: String,

    /// Line that closes a delimited group
    #[serde(default = "default_close_marker")]
    pub close_marker: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            open_marker: default_open_marker(),
            close_marker: default_close_marker(),
        }
    }
}

fn default_open_marker() -> String {
    "{".to_string()
}

fn default_close_marker() -> String {
    "}".to_string()
}

/// Configuration for one consumer and its dispatch engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Unique consumer name (used for logging/metrics)
    pub name: String,

    /// Consumer kind
    pub kind: ConsumerKind,

    /// Number of workers in the consumer's engine
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Capacity of each worker's handoff queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Kind-specific parameters (e.g. `dir` for the file consumer)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_worker_count() -> usize {
    1
}

fn default_queue_capacity() -> usize {
    64
}

/// Supported consumer kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerKind {
    /// Writes each batch as one `bulk: ...` line to the console
    Console,
    /// Writes each batch to its own `bulk<timestamp>-<n>.log` file
    File,
}
