//! The batching state machine.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use contracts::{Batch, BatchConfig, Clock, Command, CounterSink};
use dispatch::SubscriberRegistry;

use crate::error::BatcherError;

/// Counters for one stream read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Lines consumed from the stream (markers included)
    pub lines: u64,
    /// Batches delivered to the registry
    pub batches: u64,
    /// Commands delivered inside those batches
    pub commands: u64,
    /// Commands discarded by the unterminated-group policy
    pub discarded: u64,
}

/// Groups a line stream into batches and forwards them to a registry
///
/// Two boundary rules compete: a fixed size limit `N`, and an open/close
/// delimiter pair that overrides it. The delimiter lets producers group a
/// variable number of related commands atomically; the size limit only
/// applies outside a delimited group. Nesting is tracked by depth alone, so
/// only the transitions to and from depth 0 are observable downstream.
pub struct Batcher<C> {
    clock: C,
    config: BatchConfig,
    counters: Arc<dyn CounterSink>,
}

impl<C: Clock> Batcher<C> {
    /// Create a batcher with the given clock, boundary rules and counters
    pub fn new(clock: C, config: BatchConfig, counters: Arc<dyn CounterSink>) -> Self {
        Self {
            clock,
            config,
            counters,
        }
    }

    /// Consume `input` to end of stream, delivering every completed batch
    ///
    /// Marker lines are matched against the whitespace-trimmed line; every
    /// other line (empty ones included) becomes a command stamped with the
    /// clock's current time. At end of stream an open group that was never
    /// closed is discarded, not delivered: partial groups never reach
    /// consumers. The discard is logged at `warn` and counted under
    /// `reader.discarded`.
    ///
    /// # Errors
    /// Stream read errors, and enqueue errors from the registry's engines.
    pub async fn read<R>(
        &self,
        input: R,
        registry: &SubscriberRegistry,
    ) -> Result<ReadStats, BatcherError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut depth = 0usize;
        let mut buffer: Vec<Command> = Vec::new();
        let mut stats = ReadStats::default();

        while let Some(line) = lines.next_line().await? {
            stats.lines += 1;
            self.counters.incr("reader.lines");

            let trimmed = line.trim();
            if trimmed == self.config.open_marker {
                if depth == 0 {
                    self.flush(&mut buffer, registry, &mut stats).await?;
                }
                depth += 1;
            } else if trimmed == self.config.close_marker {
                // A close marker with no group open is a no-op.
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        self.flush(&mut buffer, registry, &mut stats).await?;
                    }
                }
            } else {
                buffer.push(Command::new(self.clock.now(), line));
                if depth == 0 && self.config.limit > 0 && buffer.len() == self.config.limit {
                    self.flush(&mut buffer, registry, &mut stats).await?;
                }
            }
        }

        if depth == 0 {
            self.flush(&mut buffer, registry, &mut stats).await?;
        } else if !buffer.is_empty() {
            stats.discarded = buffer.len() as u64;
            self.counters.update("reader.discarded", stats.discarded);
            warn!(
                depth,
                commands = buffer.len(),
                "unterminated group at end of stream, buffered commands discarded"
            );
        }

        debug!(
            lines = stats.lines,
            batches = stats.batches,
            commands = stats.commands,
            discarded = stats.discarded,
            "stream consumed"
        );
        Ok(stats)
    }

    async fn flush(
        &self,
        buffer: &mut Vec<Command>,
        registry: &SubscriberRegistry,
        stats: &mut ReadStats,
    ) -> Result<(), BatcherError> {
        if buffer.is_empty() {
            return Ok(());
        }

        let batch = Batch::from_commands(std::mem::take(buffer));
        stats.batches += 1;
        stats.commands += batch.len() as u64;
        self.counters.incr("reader.blocks");
        self.counters.update("reader.commands", batch.len() as u64);

        registry.process(batch).await?;
        Ok(())
    }
}
