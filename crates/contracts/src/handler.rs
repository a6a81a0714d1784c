//! BatchHandler trait - consumer-side processing interface.
//!
//! Defines the abstract interface every consumer implements.

use crate::{Batch, ContractError};

/// Per-batch processing trait
///
/// One handler instance is shared by all workers of a dispatch engine, so
/// implementations must be safe to call concurrently with different
/// `worker_id` values. `worker_id` is the stable identity of the worker
/// performing the call, letting handlers partition side effects (e.g. output
/// files) without extra locking.
#[trait_variant::make(BatchHandler: Send)]
pub trait LocalBatchHandler {
    /// Handler name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Process one batch
    ///
    /// Must not block indefinitely; it holds that worker's capacity.
    ///
    /// # Errors
    /// Returns a processing error (should include context). The engine logs
    /// and counts the failure; it never retries the batch.
    async fn handle(&self, batch: &Batch, worker_id: usize) -> Result<(), ContractError>;
}
