//! SubscriberRegistry - ordered fan-out of batches to consumer engines.

use contracts::Batch;
use tracing::{debug, info};

use crate::engine::DispatchEngine;
use crate::error::EngineError;

/// Ordered collection of consumer engines
///
/// Append-only: consumers subscribe once and stay registered. Every batch
/// handed to [`process`](Self::process) is delivered to every engine in
/// subscription order; each engine has its own queues, so one consumer's
/// backlog or failure never affects another's delivery.
#[derive(Default)]
pub struct SubscriberRegistry {
    engines: Vec<DispatchEngine>,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a consumer engine (order preserved, duplicates allowed)
    pub fn subscribe(&mut self, engine: DispatchEngine) {
        debug!(engine = %engine.name(), "consumer subscribed");
        self.engines.push(engine);
    }

    /// Number of subscribed consumers
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Check if no consumer is subscribed
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Subscribed engines in subscription order
    pub fn engines(&self) -> &[DispatchEngine] {
        &self.engines
    }

    /// Deliver one batch to every subscribed engine
    ///
    /// Enqueues with backpressure (blocking) in subscription order and
    /// returns once every engine has accepted the batch into its queue, not
    /// once it has been processed. Empty batches are never forwarded, so
    /// handlers need not special-case them.
    ///
    /// # Errors
    /// The first enqueue failure aborts delivery to the remaining engines.
    pub async fn process(&self, batch: Batch) -> Result<(), EngineError> {
        if batch.is_empty() {
            return Ok(());
        }
        for engine in &self.engines {
            engine.enqueue(batch.clone(), true).await?;
        }
        Ok(())
    }

    /// Run the full stop / wait / finish lifecycle across all engines
    ///
    /// All engines stop accepting work first, then all drain, then all
    /// workers are joined.
    ///
    /// # Errors
    /// Lifecycle errors from any engine; engines already shut down are
    /// skipped by `finish`'s idempotency.
    pub async fn shutdown(&mut self) -> Result<(), EngineError> {
        info!(consumers = self.engines.len(), "shutting down subscriber registry");
        for engine in &mut self.engines {
            engine.stop()?;
        }
        for engine in &self.engines {
            engine.wait().await?;
        }
        for engine in &mut self.engines {
            engine.finish().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BatchHandler, Command, ContractError};
    use std::sync::{Arc, Mutex};

    struct HistoryHandler {
        name: String,
        batches: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl BatchHandler for HistoryHandler {
        fn name(&self) -> &str {
            &self.name
        }

        async fn handle(&self, batch: &Batch, _worker_id: usize) -> Result<(), ContractError> {
            self.batches
                .lock()
                .expect("history lock")
                .push(batch.payloads().map(str::to_string).collect());
            Ok(())
        }
    }

    fn recording_engine(name: &str) -> (DispatchEngine, Arc<Mutex<Vec<Vec<String>>>>) {
        let batches = Arc::new(Mutex::new(Vec::new()));
        let mut engine = DispatchEngine::new(name, 16);
        engine
            .start(
                HistoryHandler {
                    name: name.to_string(),
                    batches: Arc::clone(&batches),
                },
                1,
            )
            .unwrap();
        (engine, batches)
    }

    #[tokio::test]
    async fn test_fanout_reaches_every_subscriber_in_order() {
        let (first, first_batches) = recording_engine("first");
        let (second, second_batches) = recording_engine("second");

        let mut registry = SubscriberRegistry::new();
        registry.subscribe(first);
        registry.subscribe(second);

        for i in 0..5 {
            let batch = Batch::from_commands(vec![Command::new(i, i.to_string())]);
            registry.process(batch).await.unwrap();
        }
        registry.shutdown().await.unwrap();

        let expected: Vec<Vec<String>> = (0..5).map(|i| vec![i.to_string()]).collect();
        assert_eq!(*first_batches.lock().unwrap(), expected);
        assert_eq!(*second_batches.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_empty_batch_is_never_forwarded() {
        let (engine, batches) = recording_engine("only");

        let mut registry = SubscriberRegistry::new();
        registry.subscribe(engine);

        registry.process(Batch::new()).await.unwrap();
        registry.shutdown().await.unwrap();

        assert!(batches.lock().unwrap().is_empty());
        assert_eq!(registry.engines()[0].metrics().enqueued(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_on_empty_registry() {
        let mut registry = SubscriberRegistry::new();
        assert!(registry.is_empty());
        registry.shutdown().await.unwrap();
    }
}
