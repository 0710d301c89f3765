//! Time source abstraction.
//!
//! All time-dependent logic in the engine (starting and ending
//! competitions, eviction decisions) resolves "now" through the [`Clock`]
//! capability, never through ambient time. Production uses [`SystemClock`];
//! tests inject a [`ManualClock`] they can set and advance.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// A source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Scriptable clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at the given instant.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Create a clock frozen at the current wall-clock time.
    pub fn from_system() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = *now + chrono::Duration::from_std(by).expect("duration out of range");
    }

    /// Set the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::from_system();
        let before = clock.now();

        clock.advance(Duration::from_secs(90));

        assert_eq!(clock.now() - before, chrono::Duration::seconds(90));
    }

    #[test]
    fn test_manual_clock_is_frozen_between_advances() {
        let clock = ManualClock::from_system();
        assert_eq!(clock.now(), clock.now());
    }
}
