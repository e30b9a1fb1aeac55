//! Time sources for the countdown engine.
//!
//! The engine never counts ticks; it asks a [`Clock`] for the current time on
//! every computation. All clocks report milliseconds since the Unix epoch so
//! end times from the host (`setEnd`) can be compared directly.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// A source of "now" in epoch milliseconds.
pub trait Clock: Send + 'static {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time. Jumps with the system clock and keeps advancing while the
/// machine sleeps, which is what a countdown wants after a suspend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Monotonic time anchored to the wall clock at construction.
///
/// Immune to wall-clock adjustments. Built on `tokio::time::Instant`, so it
/// follows paused/advanced time inside tokio tests.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor: tokio::time::Instant,
    anchor_epoch_ms: i64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::anchored_at(Utc::now().timestamp_millis())
    }

    /// Anchor the current instant to an explicit epoch value.
    pub fn anchored_at(epoch_ms: i64) -> Self {
        Self {
            anchor: tokio::time::Instant::now(),
            anchor_epoch_ms: epoch_ms,
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.anchor.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.anchor_epoch_ms.saturating_add(elapsed)
    }
}

/// A clock moved only by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
