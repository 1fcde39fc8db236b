//! Microsecond clocks for START timestamps

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Source of the microsecond counter printed before each START
pub trait Clock {
    /// Current counter value. Wraps at `u32::MAX`.
    fn now_us(&self) -> u32;
}

/// Microseconds since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock counting from now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u32 {
        // Truncation gives the same wrap as a free-running 32-bit timer.
        self.origin.elapsed().as_micros() as u32
    }
}

/// Deterministic clock: returns `start`, then advances by `step` on every read
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU32,
    step: u32,
}

impl ManualClock {
    /// Create a clock fixed at `start`
    pub fn new(start: u32) -> Self {
        Self {
            now: AtomicU32::new(start),
            step: 0,
        }
    }

    /// Advance by `step` microseconds after every read
    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    /// Jump to `now`
    pub fn set(&self, now: u32) {
        self.now.store(now, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u32 {
        // fetch_add on AtomicU32 wraps on overflow
        self.now.fetch_add(self.step, Ordering::Relaxed)
    }
}
