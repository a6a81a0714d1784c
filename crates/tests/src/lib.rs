//! # Integration Tests
//!
//! End-to-end tests over the whole pipeline: stream -> batcher ->
//! subscriber registry -> consumer engines -> sinks.

#[cfg(test)]
mod e2e_tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use batcher::Batcher;
    use contracts::{ConsumerConfig, ConsumerKind, CounterSink, ManualClock};
    use dispatch::{create_consumer_engine, ConsoleSink, DispatchEngine, FileSink, SubscriberRegistry};
    use observability::MemoryCounters;
    use tempfile::tempdir;

    /// Shared byte buffer usable as a console sink writer
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn console_engine(
        counters: Arc<dyn CounterSink>,
    ) -> (DispatchEngine, SharedBuf) {
        let buf = SharedBuf::default();
        let mut engine = DispatchEngine::new("console", 64);
        engine
            .start(ConsoleSink::new("console", buf.clone(), counters), 1)
            .unwrap();
        (engine, buf)
    }

    /// Full flow: mixed size-limit and delimiter batching, fanned out to a
    /// console consumer and a two-worker file consumer.
    #[tokio::test]
    async fn test_e2e_stream_to_console_and_file() {
        let dir = tempdir().unwrap();
        let counters = Arc::new(MemoryCounters::new());

        let (console, console_out) = console_engine(Arc::clone(&counters) as Arc<dyn CounterSink>);

        let file_sink = FileSink::new(
            "file",
            dir.path(),
            Arc::clone(&counters) as Arc<dyn CounterSink>,
        )
        .unwrap();
        let mut file_engine = DispatchEngine::new("file", 64);
        file_engine.start(file_sink, 2).unwrap();

        let mut registry = SubscriberRegistry::new();
        registry.subscribe(console);
        registry.subscribe(file_engine);

        // Stepping clock: every batch gets a distinct first timestamp.
        let batcher = Batcher::new(
            ManualClock::stepping(100, 1),
            contracts::BatchConfig {
                limit: 2,
                ..Default::default()
            },
            Arc::clone(&counters) as Arc<dyn CounterSink>,
        );

        let input = "one\ntwo\nthree\n{\nfour\nfive\n}\n";
        let stats = batcher.read(input.as_bytes(), &registry).await.unwrap();
        registry.shutdown().await.unwrap();

        assert_eq!(stats.batches, 3);
        assert_eq!(stats.commands, 5);

        // Console consumer saw every batch in order, one line each.
        assert_eq!(
            console_out.contents(),
            "bulk: one, two\nbulk: three\nbulk: four, five\n"
        );

        // File consumer wrote one file per batch, named by first timestamp.
        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("bulk100-0.log"), "one\ntwo\n");
        assert_eq!(read("bulk102-0.log"), "three\n");
        assert_eq!(read("bulk103-0.log"), "four\nfive\n");

        // Both consumers account for the same delivery volume.
        assert_eq!(counters.get("reader.lines"), 7);
        assert_eq!(counters.get("reader.blocks"), 3);
        assert_eq!(counters.get("reader.commands"), 5);
        assert_eq!(counters.get("console.blocks"), 3);
        assert_eq!(counters.get("console.commands"), 5);
        assert_eq!(counters.get("file.blocks"), 3);
        assert_eq!(counters.get("file.commands"), 5);
    }

    /// A blueprint-built file consumer allocates distinct suffixes when
    /// several batches share one timestamp, across both of its workers.
    #[tokio::test]
    async fn test_e2e_blueprint_file_consumer_suffixes() {
        let dir = tempdir().unwrap();
        let counters = Arc::new(MemoryCounters::new());

        let toml = format!(
            r#"
[batch]
limit = 1

[[consumers]]
name = "file"
kind = "file"
worker_count = 2
[consumers.params]
dir = "{}"
"#,
            dir.path().display()
        );
        let blueprint =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(blueprint.consumers.len(), 1);

        let mut registry = SubscriberRegistry::new();
        let engine = create_consumer_engine(
            &blueprint.consumers[0],
            Arc::clone(&counters) as Arc<dyn CounterSink>,
        )
        .unwrap();
        registry.subscribe(engine);

        // Fixed clock: every batch collides on the same timestamp.
        let batcher = Batcher::new(
            ManualClock::fixed(42),
            blueprint.batch.clone(),
            Arc::clone(&counters) as Arc<dyn CounterSink>,
        );

        let stats = batcher.read("a\nb\nc\n".as_bytes(), &registry).await.unwrap();
        registry.shutdown().await.unwrap();

        assert_eq!(stats.batches, 3);

        // Same timestamp, three batches: suffixes 0, 1 and 2.
        let mut payloads = Vec::new();
        for suffix in 0..3 {
            let path = dir.path().join(format!("bulk42-{suffix}.log"));
            payloads.push(std::fs::read_to_string(&path).unwrap());
        }
        // Worker interleaving decides which batch got which suffix.
        payloads.sort();
        assert_eq!(payloads, vec!["a\n", "b\n", "c\n"]);
    }

    /// Commands inside a group that never closes are dropped before any
    /// consumer can observe them.
    #[tokio::test]
    async fn test_e2e_unterminated_group_is_invisible_to_consumers() {
        let counters = Arc::new(MemoryCounters::new());
        let (console, console_out) = console_engine(Arc::clone(&counters) as Arc<dyn CounterSink>);

        let mut registry = SubscriberRegistry::new();
        registry.subscribe(console);

        let batcher = Batcher::new(
            ManualClock::stepping(0, 1),
            contracts::BatchConfig::default(),
            Arc::clone(&counters) as Arc<dyn CounterSink>,
        );

        let input = "done\n{\nlost1\nlost2\n";
        let stats = batcher.read(input.as_bytes(), &registry).await.unwrap();
        registry.shutdown().await.unwrap();

        assert_eq!(stats.discarded, 2);
        assert_eq!(console_out.contents(), "bulk: done\n");
        assert_eq!(counters.get("console.commands"), 1);
        assert_eq!(counters.get("reader.discarded"), 2);
    }

    /// An empty stream produces no output and no files.
    #[tokio::test]
    async fn test_e2e_empty_stream() {
        let dir = tempdir().unwrap();
        let counters = Arc::new(MemoryCounters::new());

        let (console, console_out) = console_engine(Arc::clone(&counters) as Arc<dyn CounterSink>);
        let config = ConsumerConfig {
            name: "file".to_string(),
            kind: ConsumerKind::File,
            worker_count: 2,
            queue_capacity: 16,
            params: [("dir".to_string(), dir.path().display().to_string())]
                .into_iter()
                .collect(),
        };
        let file_engine =
            create_consumer_engine(&config, Arc::clone(&counters) as Arc<dyn CounterSink>).unwrap();

        let mut registry = SubscriberRegistry::new();
        registry.subscribe(console);
        registry.subscribe(file_engine);

        let batcher = Batcher::new(
            ManualClock::fixed(0),
            contracts::BatchConfig {
                limit: 3,
                ..Default::default()
            },
            Arc::clone(&counters) as Arc<dyn CounterSink>,
        );

        let stats = batcher.read("".as_bytes(), &registry).await.unwrap();
        registry.shutdown().await.unwrap();

        assert_eq!(stats.batches, 0);
        assert!(console_out.contents().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Custom markers from a blueprint drive the same grouping semantics.
    #[tokio::test]
    async fn test_e2e_custom_markers() {
        let counters = Arc::new(MemoryCounters::new());
        let (console, console_out) = console_engine(Arc::clone(&counters) as Arc<dyn CounterSink>);

        let mut registry = SubscriberRegistry::new();
        registry.subscribe(console);

        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
[batch]
limit = 2
open_marker = "begin"
close_marker = "end"

[[consumers]]
name = "console"
kind = "console"
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let batcher = Batcher::new(
            ManualClock::stepping(0, 1),
            blueprint.batch.clone(),
            Arc::clone(&counters) as Arc<dyn CounterSink>,
        );

        let input = "1\nbegin\n2\n3\n4\nend\n5\n";
        batcher.read(input.as_bytes(), &registry).await.unwrap();
        registry.shutdown().await.unwrap();

        assert_eq!(
            console_out.contents(),
            "bulk: 1\nbulk: 2, 3, 4\nbulk: 5\n"
        );
    }
}
