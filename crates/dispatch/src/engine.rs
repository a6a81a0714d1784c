//! DispatchEngine - per-consumer worker pool with an explicit lifecycle.
//!
//! Each engine owns a fixed set of workers, one bounded handoff queue per
//! worker. Batches are assigned round-robin, which keeps assignment fair and
//! makes per-worker processing order equal to per-worker assignment order.
//! The split `stop` / `wait` / `finish` lifecycle gives the owner three
//! separate guarantees: no more new work, all accepted work is done, and no
//! worker tasks are left behind.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use contracts::{Batch, BatchHandler};

use crate::error::EngineError;
use crate::metrics::EngineMetrics;

/// Engine lifecycle state; transitions only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, no workers yet
    Created,
    /// Workers running, accepting batches
    Running,
    /// No new batches accepted, queued batches still processing
    Draining,
    /// Workers joined, engine finished
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// The per-consumer batch dispatcher
pub struct DispatchEngine {
    name: String,
    queue_capacity: usize,
    state: EngineState,
    worker_count: usize,
    /// One sender per worker; emptied at `stop` so workers see end-of-queue
    queues: Vec<mpsc::Sender<Batch>>,
    workers: Vec<JoinHandle<()>>,
    cursor: AtomicUsize,
    /// Batches accepted but not yet through their handler
    pending: Arc<AtomicU64>,
    drained: Arc<Notify>,
    metrics: Arc<EngineMetrics>,
}

impl DispatchEngine {
    /// Create an engine in the `Created` state
    pub fn new(name: impl Into<String>, queue_capacity: usize) -> Self {
        Self {
            name: name.into(),
            // mpsc::channel panics on zero capacity
            queue_capacity: queue_capacity.max(1),
            state: EngineState::Created,
            worker_count: 0,
            queues: Vec::new(),
            workers: Vec::new(),
            cursor: AtomicUsize::new(0),
            pending: Arc::new(AtomicU64::new(0)),
            drained: Arc::new(Notify::new()),
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    /// Engine name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of workers started
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Engine metrics
    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    /// Spawn `worker_count` workers sharing `handler` and begin accepting work
    ///
    /// Each worker gets a fixed identity in `[0, worker_count)` which it
    /// passes to every handler invocation. May be called exactly once.
    ///
    /// # Errors
    /// [`EngineError::Lifecycle`] unless the engine is still `Created`;
    /// [`EngineError::NoWorkers`] for a zero worker count.
    pub fn start<H>(&mut self, handler: H, worker_count: usize) -> Result<(), EngineError>
    where
        H: BatchHandler + Send + Sync + 'static,
    {
        if self.state != EngineState::Created {
            return Err(EngineError::lifecycle(&self.name, "start", self.state));
        }
        if worker_count == 0 {
            return Err(EngineError::NoWorkers {
                engine: self.name.clone(),
            });
        }

        let handler = Arc::new(handler);
        for worker_id in 0..worker_count {
            let (tx, rx) = mpsc::channel(self.queue_capacity);
            let worker = EngineWorker {
                engine: self.name.clone(),
                worker_id,
                handler: Arc::clone(&handler),
                pending: Arc::clone(&self.pending),
                drained: Arc::clone(&self.drained),
                metrics: Arc::clone(&self.metrics),
            };
            self.queues.push(tx);
            self.workers.push(tokio::spawn(worker.run(rx)));
        }

        self.worker_count = worker_count;
        self.state = EngineState::Running;
        info!(engine = %self.name, workers = worker_count, "dispatch engine started");
        Ok(())
    }

    /// Hand a batch to one worker for eventual processing
    ///
    /// With `blocking == true` the caller suspends while the target queue is
    /// full (backpressure); with `blocking == false` a full queue surfaces as
    /// [`EngineError::QueueFull`] and the batch is returned to the caller
    /// untouched, never silently dropped.
    ///
    /// # Errors
    /// [`EngineError::Lifecycle`] once `stop()` has been called (or before
    /// `start()`); [`EngineError::QueueFull`] as above.
    pub async fn enqueue(&self, batch: Batch, blocking: bool) -> Result<(), EngineError> {
        if self.state != EngineState::Running {
            self.metrics.inc_rejected();
            return Err(EngineError::lifecycle(&self.name, "enqueue", self.state));
        }

        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.queues.len();
        let queue = &self.queues[slot];

        // Count the batch as pending before it can possibly complete, so a
        // concurrent wait() never observes a drained engine too early.
        self.pending.fetch_add(1, Ordering::AcqRel);

        let sent = if blocking {
            queue.send(batch).await.map_err(|_| EngineError::WorkerGone {
                engine: self.name.clone(),
                worker_id: slot,
            })
        } else {
            queue.try_send(batch).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => EngineError::QueueFull {
                    engine: self.name.clone(),
                },
                mpsc::error::TrySendError::Closed(_) => EngineError::WorkerGone {
                    engine: self.name.clone(),
                    worker_id: slot,
                },
            })
        };

        match sent {
            Ok(()) => {
                self.metrics.inc_enqueued();
                Ok(())
            }
            Err(e) => {
                release_pending(&self.pending, &self.drained);
                self.metrics.inc_rejected();
                Err(e)
            }
        }
    }

    /// Stop accepting new batches; already-queued batches keep draining
    ///
    /// # Errors
    /// [`EngineError::Lifecycle`] unless the engine is `Running`.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Running {
            return Err(EngineError::lifecycle(&self.name, "stop", self.state));
        }
        // Dropping the senders closes every worker queue; workers exit after
        // handling what is already buffered.
        self.queues.clear();
        self.state = EngineState::Draining;
        info!(
            engine = %self.name,
            pending = self.pending.load(Ordering::Acquire),
            "dispatch engine draining"
        );
        Ok(())
    }

    /// Suspend until every batch accepted before `stop()` has been handled
    ///
    /// # Errors
    /// [`EngineError::Lifecycle`] unless `stop()` was called first. A no-op
    /// on an already `Stopped` engine.
    pub async fn wait(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Draining => {}
            EngineState::Stopped => return Ok(()),
            state => return Err(EngineError::lifecycle(&self.name, "wait", state)),
        }

        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register before checking, so a decrement-to-zero between the
            // load and the await cannot be missed.
            notified.as_mut().enable();
            if self.pending.load(Ordering::Acquire) == 0 {
                return Ok(());
            }
            notified.await;
        }
    }

    /// Join all worker tasks and release their resources
    ///
    /// Call after `wait()`. Idempotent once the engine is `Stopped`.
    ///
    /// # Errors
    /// [`EngineError::Lifecycle`] if the engine was never stopped.
    pub async fn finish(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Draining => {}
            EngineState::Stopped => return Ok(()),
            state => return Err(EngineError::lifecycle(&self.name, "finish", state)),
        }

        for (worker_id, handle) in self.workers.drain(..).enumerate() {
            if let Err(e) = handle.await {
                error!(engine = %self.name, worker_id, error = ?e, "worker task panicked");
            }
        }
        self.state = EngineState::Stopped;
        debug!(engine = %self.name, "dispatch engine finished");
        Ok(())
    }
}

fn release_pending(pending: &AtomicU64, drained: &Notify) {
    if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
        drained.notify_waiters();
    }
}

/// One worker of an engine; pulls from its own queue in FIFO order
struct EngineWorker<H> {
    engine: String,
    worker_id: usize,
    handler: Arc<H>,
    pending: Arc<AtomicU64>,
    drained: Arc<Notify>,
    metrics: Arc<EngineMetrics>,
}

impl<H: BatchHandler + Send + Sync + 'static> EngineWorker<H> {
    async fn run(self, mut rx: mpsc::Receiver<Batch>) {
        debug!(engine = %self.engine, worker_id = self.worker_id, "engine worker started");

        while let Some(batch) = rx.recv().await {
            self.metrics.set_queue_len(rx.len());

            // Dropped even if the handler panics, so wait() still accounts
            // for the in-flight batch.
            let _ticket = DrainTicket {
                pending: Arc::clone(&self.pending),
                drained: Arc::clone(&self.drained),
            };

            match self.handler.handle(&batch, self.worker_id).await {
                Ok(()) => self.metrics.inc_processed(),
                Err(e) => {
                    self.metrics.inc_failed();
                    error!(
                        engine = %self.engine,
                        worker_id = self.worker_id,
                        commands = batch.len(),
                        error = %e,
                        "handler failed"
                    );
                }
            }
        }

        debug!(engine = %self.engine, worker_id = self.worker_id, "engine worker stopped");
    }
}

struct DrainTicket {
    pending: Arc<AtomicU64>,
    drained: Arc<Notify>,
}

impl Drop for DrainTicket {
    fn drop(&mut self) {
        release_pending(&self.pending, &self.drained);
    }
}
