//! Batcher error types

use thiserror::Error;

/// Errors surfaced while reading a command stream
#[derive(Debug, Error)]
pub enum BatcherError {
    /// Input stream read error
    #[error("stream read error: {0}")]
    Io(#[from] std::io::Error),

    /// Downstream engine rejected a batch
    #[error("dispatch error: {0}")]
    Engine(#[from] dispatch::EngineError),
}
