//! Clock trait - pluggable time source for command stamping.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Time source used to stamp commands on arrival
///
/// Substitutable for deterministic testing; see [`ManualClock`].
pub trait Clock: Send + Sync {
    /// Current time, seconds since the Unix epoch
    fn now(&self) -> i64;
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Deterministic clock for tests
///
/// Returns the current value on every `now()` call and then advances it by a
/// fixed step (0 = frozen). The value can also be moved explicitly.
#[derive(Debug)]
pub struct ManualClock {
    current: AtomicI64,
    step: i64,
}

impl ManualClock {
    /// Frozen clock that always returns `start`
    pub fn fixed(start: i64) -> Self {
        Self {
            current: AtomicI64::new(start),
            step: 0,
        }
    }

    /// Clock that advances by `step` after every `now()` call
    pub fn stepping(start: i64, step: i64) -> Self {
        Self {
            current: AtomicI64::new(start),
            step,
        }
    }

    /// Move the clock forward by `delta` seconds
    pub fn advance(&self, delta: i64) {
        self.current.fetch_add(delta, Ordering::SeqCst);
    }

    /// Set the clock to an absolute value
    pub fn set(&self, value: i64) {
        self.current.store(value, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.current.fetch_add(self.step, Ordering::SeqCst)
    }
}
