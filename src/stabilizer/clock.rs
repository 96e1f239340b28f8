//! Monotonic time source for the stabilizer cooldown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock moved by hand, shared between clones.
///
/// Tests advance it explicitly; trace replay sets it from recorded frame
/// timestamps so cooldowns follow the recording rather than wall time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_us: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_us: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.offset_us
            .fetch_add(duration.as_micros() as u64, Ordering::SeqCst);
    }

    /// Set the time elapsed since the clock was created. Never moves backwards.
    pub fn set_elapsed(&self, elapsed: Duration) {
        self.offset_us
            .fetch_max(elapsed.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.offset_us.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }
}
