//! Counter sinks backing the pipeline's named counters.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard};

use contracts::CounterSink;

/// In-memory counter store
///
/// Accumulates named counters for the end-of-run summary. Cheap enough to
/// update from every worker; reads only happen once per run.
#[derive(Debug, Default)]
pub struct MemoryCounters {
    values: Mutex<HashMap<String, u64>>,
}

impl MemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current value of one counter (0 when never updated)
    pub fn get(&self, name: &str) -> u64 {
        self.values().get(name).copied().unwrap_or(0)
    }

    /// All counters, sorted by name
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.values()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Multi-line `name: value` report, sorted by name
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.snapshot() {
            let _ = writeln!(out, "{name}: {value}");
        }
        out
    }
}

impl CounterSink for MemoryCounters {
    fn update(&self, name: &str, delta: u64) {
        *self.values().entry(name.to_string()).or_insert(0) += delta;
    }
}

/// Counter sink publishing through the `metrics` facade
///
/// Makes every pipeline counter visible to the Prometheus exporter under
/// its own name.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCounters;

impl CounterSink for MetricsCounters {
    fn update(&self, name: &str, delta: u64) {
        metrics::counter!(name.to_string()).increment(delta);
    }
}

/// Forwards every update to a list of sinks
#[derive(Default)]
pub struct FanoutCounters {
    sinks: Vec<Arc<dyn CounterSink>>,
}

impl FanoutCounters {
    pub fn new(sinks: Vec<Arc<dyn CounterSink>>) -> Self {
        Self { sinks }
    }
}

impl CounterSink for FanoutCounters {
    fn update(&self, name: &str, delta: u64) {
        for sink in &self.sinks {
            sink.update(name, delta);
        }
    }
}
