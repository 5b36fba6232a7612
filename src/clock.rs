//! Timestamp source
//!
//! Services stamp `created_at`/`updated_at` from an injected clock rather
//! than reading the system time themselves.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests
///
/// Each call returns the current instant and then advances it by `step`, so
/// records created in sequence get strictly increasing timestamps.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl FixedClock {
    /// A clock that always returns `at`
    pub fn at(at: DateTime<Utc>) -> Self {
        Self::stepping(at, Duration::zero())
    }

    /// A clock starting at `start` that advances by `step` per reading
    pub fn stepping(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current: Mutex::new(start),
            step,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = *current;
        *current = now + self.step;
        now
    }
}
