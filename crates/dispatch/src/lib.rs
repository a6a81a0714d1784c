//! # Dispatch
//!
//! Concurrent batch dispatching.
//!
//! Responsibilities:
//! - Run one [`DispatchEngine`] (worker pool + handoff queues) per consumer
//! - Fan completed batches out to every subscribed consumer
//! - Isolate slow or failing consumers from each other

pub mod engine;
pub mod error;
pub mod factory;
pub mod metrics;
pub mod registry;
pub mod sinks;

pub use contracts::{Batch, BatchHandler, Command};
pub use engine::{DispatchEngine, EngineState};
pub use error::EngineError;
pub use factory::create_consumer_engine;
pub use metrics::{EngineMetrics, EngineMetricsSnapshot};
pub use registry::SubscriberRegistry;
pub use sinks::{ConsoleSink, FileSink};
