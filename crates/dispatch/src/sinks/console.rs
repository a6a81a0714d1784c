//! ConsoleSink - writes each batch as a single `bulk:` line.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use contracts::{Batch, BatchHandler, ContractError, CounterSink};

/// Consumer that prints every batch as `bulk: p1, p2, ...`
///
/// The writer sits behind a mutex, so the sink is safe with any worker count
/// even though the default blueprint runs it with one worker.
pub struct ConsoleSink<W> {
    name: String,
    out: Mutex<W>,
    counters: Arc<dyn CounterSink>,
}

impl ConsoleSink<io::Stdout> {
    /// Console sink writing to the process stdout
    pub fn stdout(name: impl Into<String>, counters: Arc<dyn CounterSink>) -> Self {
        Self::new(name, io::stdout(), counters)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Console sink writing to an arbitrary target (used by tests)
    pub fn new(name: impl Into<String>, out: W, counters: Arc<dyn CounterSink>) -> Self {
        Self {
            name: name.into(),
            out: Mutex::new(out),
            counters,
        }
    }

    fn render(batch: &Batch) -> String {
        let mut line = String::from("bulk: ");
        for (i, payload) in batch.payloads().enumerate() {
            if i > 0 {
                line.push_str(", ");
            }
            line.push_str(payload);
        }
        line
    }
}

impl<W: Write + Send> BatchHandler for ConsoleSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, batch: &Batch, _worker_id: usize) -> Result<(), ContractError> {
        self.counters.incr("console.blocks");
        self.counters.update("console.commands", batch.len() as u64);

        let line = Self::render(batch);
        let mut out = self
            .out
            .lock()
            .map_err(|_| ContractError::handler_failure(&self.name, "output writer poisoned"))?;
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}
