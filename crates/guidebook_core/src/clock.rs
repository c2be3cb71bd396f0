//! Wall-clock source for persisted timestamps.
//!
//! Timestamps are Unix epoch milliseconds, matching the storage shape.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" for user-data writes.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        // A clock before 1970 is reported as the epoch itself.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Manually driven clock for deterministic callers and tests.
///
/// Every read advances the clock by `step_ms`.
#[derive(Debug)]
pub struct ManualClock {
    current: AtomicI64,
    step_ms: i64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self::with_step(start_ms, 1)
    }

    pub fn with_step(start_ms: i64, step_ms: i64) -> Self {
        Self {
            current: AtomicI64::new(start_ms),
            step_ms,
        }
    }

    /// Moves the clock forward without reading it.
    pub fn advance(&self, delta_ms: i64) {
        self.current.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.current.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}
