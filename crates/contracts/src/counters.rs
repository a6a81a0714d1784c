//! CounterSink trait - fire-and-forget named counters.
//!
//! The core reports counters like `reader.lines` or `file.blocks` through this
//! interface. Updates are infallible by contract: a misbehaving sink must never
//! affect pipeline correctness, so there is nothing to propagate.

use std::sync::Arc;

/// Named counter sink
pub trait CounterSink: Send + Sync {
    /// Add `delta` to the counter called `name`
    fn update(&self, name: &str, delta: u64);

    /// Add 1 to the counter called `name`
    fn incr(&self, name: &str) {
        self.update(name, 1);
    }
}

/// Counter sink that discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCounters;

impl CounterSink for NullCounters {
    fn update(&self, _name: &str, _delta: u64) {}
}

impl<T: CounterSink + ?Sized> CounterSink for Arc<T> {
    fn update(&self, name: &str, delta: u64) {
        (**self).update(name, delta);
    }
}
