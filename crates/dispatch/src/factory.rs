//! Consumer factory - builds a started engine from configuration.

use std::sync::Arc;

use tracing::instrument;

use contracts::{ConsumerConfig, ConsumerKind, CounterSink};

use crate::engine::DispatchEngine;
use crate::error::EngineError;
use crate::sinks::{ConsoleSink, FileSink};

/// Create and start a consumer's engine from its configuration
///
/// # Errors
/// Consumer construction errors (e.g. unwritable file sink directory) and
/// engine start errors.
#[instrument(
    name = "create_consumer_engine",
    skip(config, counters),
    fields(consumer = %config.name, kind = ?config.kind)
)]
pub fn create_consumer_engine(
    config: &ConsumerConfig,
    counters: Arc<dyn CounterSink>,
) -> Result<DispatchEngine, EngineError> {
    let mut engine = DispatchEngine::new(&config.name, config.queue_capacity);
    match config.kind {
        ConsumerKind::Console => {
            let sink = ConsoleSink::stdout(&config.name, counters);
            engine.start(sink, config.worker_count)?;
        }
        ConsumerKind::File => {
            let sink = FileSink::from_params(&config.name, &config.params, counters)
                .map_err(|e| EngineError::consumer_creation(&config.name, e.to_string()))?;
            engine.start(sink, config.worker_count)?;
        }
    }
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineState;
    use contracts::NullCounters;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_factory_builds_running_file_engine() {
        let dir = tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert("dir".to_string(), dir.path().display().to_string());

        let config = ConsumerConfig {
            name: "file".to_string(),
            kind: ConsumerKind::File,
            worker_count: 2,
            queue_capacity: 16,
            params,
        };

        let mut engine = create_consumer_engine(&config, Arc::new(NullCounters)).unwrap();
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.worker_count(), 2);

        engine.stop().unwrap();
        engine.wait().await.unwrap();
        engine.finish().await.unwrap();
    }

    #[tokio::test]
    async fn test_factory_builds_running_console_engine() {
        let config = ConsumerConfig {
            name: "console".to_string(),
            kind: ConsumerKind::Console,
            worker_count: 1,
            queue_capacity: 16,
            params: HashMap::new(),
        };

        let mut engine = create_consumer_engine(&config, Arc::new(NullCounters)).unwrap();
        assert_eq!(engine.state(), EngineState::Running);

        engine.stop().unwrap();
        engine.wait().await.unwrap();
        engine.finish().await.unwrap();
    }
}
