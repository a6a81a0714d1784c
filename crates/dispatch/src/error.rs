//! Dispatch error types

use thiserror::Error;

use crate::engine::EngineState;

/// Engine and registry errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Lifecycle misuse - an operation called in the wrong state
    #[error("engine '{engine}': {operation} is not legal in state {state}")]
    Lifecycle {
        engine: String,
        operation: &'static str,
        state: EngineState,
    },

    /// Non-blocking enqueue against a full queue
    #[error("engine '{engine}': queue full, batch rejected")]
    QueueFull { engine: String },

    /// Engine started with zero workers
    #[error("engine '{engine}' requires at least one worker")]
    NoWorkers { engine: String },

    /// The target worker's queue closed unexpectedly
    #[error("engine '{engine}': worker {worker_id} is gone")]
    WorkerGone { engine: String, worker_id: usize },

    /// Consumer construction error
    #[error("failed to create consumer '{name}': {message}")]
    ConsumerCreation { name: String, message: String },

    /// Contract-level error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl EngineError {
    /// Create a lifecycle misuse error
    pub fn lifecycle(engine: impl Into<String>, operation: &'static str, state: EngineState) -> Self {
        Self::Lifecycle {
            engine: engine.into(),
            operation,
            state,
        }
    }

    /// Create a consumer creation error
    pub fn consumer_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConsumerCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
