//! # Batcher
//!
//! Stream batching state machine.
//!
//! Responsibilities:
//! - Consume a line stream and stamp every command with its arrival time
//! - Decide batch boundaries under the size limit and the delimiter rules
//! - Forward every completed batch to the subscriber registry

mod batcher;
mod error;

pub use batcher::{Batcher, ReadStats};
pub use contracts::{Batch, BatchConfig, Clock, Command};
pub use error::BatcherError;
