//! # Time Sources
//!
//! The rate limiter needs to know what time it is *now*, at the moment a
//! call runs. Never cache the result of [`Clock::now`] across calls.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// A source of the current time.
pub trait Clock {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can hand one clone
/// to a vault and keep another to advance time from the outside.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `by` and returns the new time. Negative
    /// durations are ignored; time in this crate only moves one way.
    ///
    /// Returns `None`, leaving the clock where it was, if the result would
    /// fall past the last representable instant.
    pub fn advance(&self, by: Duration) -> Option<DateTime<Utc>> {
        let mut now = self.now.lock();
        if by > Duration::zero() {
            *now = now.checked_add_signed(by)?;
        }
        Some(*now)
    }

    /// Sets the clock to `at` if that is not earlier than the current time.
    pub fn set(&self, at: DateTime<Utc>) {
        let mut now = self.now.lock();
        if at > *now {
            *now = at;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
