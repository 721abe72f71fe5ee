use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};

/// Time source for duration accounting and time-derived names.
pub trait Clock: Send + Sync {
    /// Monotonic time since an arbitrary origin. Never goes backwards.
    fn monotonic(&self) -> Duration;

    /// Current wall-clock time, used for ids, file names and `created_at`.
    fn wall(&self) -> DateTime<Utc>;
}

/// Clock backed by [`Instant`] and the system wall clock.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose monotonic origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for deterministic tests and simulations.
///
/// Both readings only move when [`ManualClock::advance`] is called.
pub struct ManualClock {
    inner: Mutex<ManualClockInner>,
}

struct ManualClockInner {
    elapsed: Duration,
    wall: DateTime<Utc>,
}

impl ManualClock {
    /// Create a clock frozen at `wall` with zero elapsed monotonic time.
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(ManualClockInner {
                elapsed: Duration::ZERO,
                wall,
            }),
        }
    }

    /// Move both monotonic and wall time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.elapsed += by;
        if let Ok(step) = chrono::Duration::from_std(by) {
            inner.wall += step;
        }
    }
}

impl Clock for ManualClock {
    fn monotonic(&self) -> Duration {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).elapsed
    }

    fn wall(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).wall
    }
}
