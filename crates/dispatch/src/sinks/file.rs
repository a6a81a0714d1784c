//! FileSink - writes each batch to its own log file.
//!
//! File names follow `bulk<timestamp>-<suffix>.log`, where `<timestamp>` is
//! the first command's arrival time and `<suffix>` distinguishes batches that
//! share a timestamp. The suffix comes from a guarded per-timestamp counter,
//! so two workers flushing batches with the same timestamp can never pick the
//! same name.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use contracts::{Batch, BatchHandler, ContractError, CounterSink};

/// Consumer that persists every batch as a `bulk<timestamp>-<n>.log` file
pub struct FileSink {
    name: String,
    dir: PathBuf,
    counters: Arc<dyn CounterSink>,
    /// timestamp -> last used suffix, shared across this sink's workers
    suffixes: Mutex<HashMap<i64, u64>>,
}

impl FileSink {
    /// Create a file sink writing into `dir` (created if missing)
    pub fn new(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        counters: Arc<dyn CounterSink>,
    ) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            name: name.into(),
            dir,
            counters,
            suffixes: Mutex::new(HashMap::new()),
        })
    }

    /// Create from a params map (for the consumer factory)
    ///
    /// Recognized params: `dir` (output directory, default `.`).
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        counters: Arc<dyn CounterSink>,
    ) -> std::io::Result<Self> {
        let dir = params
            .get("dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(name, dir, counters)
    }

    /// Pick the suffix for a batch with the given first timestamp
    ///
    /// The read and increment happen under one lock acquisition; the returned
    /// `(timestamp, suffix)` pair is unique across workers.
    fn next_suffix(&self, timestamp: i64) -> Result<u64, ContractError> {
        let mut suffixes = self
            .suffixes
            .lock()
            .map_err(|_| ContractError::handler_failure(&self.name, "suffix map poisoned"))?;

        Ok(match suffixes.entry(timestamp) {
            Entry::Occupied(mut used) => {
                *used.get_mut() += 1;
                *used.get()
            }
            Entry::Vacant(slot) => {
                slot.insert(0);
                0
            }
        })
    }

    fn write_batch(&self, batch: &Batch, path: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        for payload in batch.payloads() {
            writeln!(file, "{payload}")?;
        }
        Ok(())
    }
}

impl BatchHandler for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, batch: &Batch, worker_id: usize) -> Result<(), ContractError> {
        self.counters.incr("file.blocks");
        self.counters.update("file.commands", batch.len() as u64);
        self.counters.incr(&format!("file.{worker_id}.blocks"));
        self.counters
            .update(&format!("file.{worker_id}.commands"), batch.len() as u64);

        let timestamp = batch
            .first_timestamp()
            .ok_or_else(|| ContractError::handler_failure(&self.name, "received an empty batch"))?;
        let suffix = self.next_suffix(timestamp)?;
        let path = self.dir.join(format!("bulk{timestamp}-{suffix}.log"));

        self.write_batch(batch, &path)?;
        debug!(sink = %self.name, worker_id, path = %path.display(), commands = batch.len(), "batch written");
        Ok(())
    }
}
