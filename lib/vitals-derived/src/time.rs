//! Time sources for windowed statistics.
//!
//! Exponential histograms work on plain integer timestamps, and trust that they never go backwards. Each
//! [`TimeSource`] here produces timestamps in a fixed unit; the window of any histogram fed from a time source must be
//! expressed in that same unit.

use std::{
    sync::{
        atomic::{AtomicI64, Ordering::Relaxed},
        Arc,
    },
    time::{Instant, SystemTime},
};

/// A source of non-decreasing timestamps.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp.
    fn now(&self) -> i64;
}

impl<T> TimeSource for Arc<T>
where
    T: TimeSource + ?Sized,
{
    fn now(&self) -> i64 {
        (**self).now()
    }
}

/// A monotonic clock, in nanoseconds since the clock was created.
///
/// This is the right choice for most windowed statistics, as it is unaffected by changes to the system clock.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a new `MonotonicClock` starting at zero.
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }
}

/// The system clock, in seconds since the Unix epoch.
///
/// The system clock can go backwards (NTP adjustments, manual changes, and so on), which histograms do not guard
/// against. Prefer [`MonotonicClock`] unless timestamps need to line up with wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnixClock;

impl TimeSource for UnixClock {
    fn now(&self) -> i64 {
        let since_unix_epoch = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        i64::try_from(since_unix_epoch.as_secs()).unwrap_or(i64::MAX)
    }
}

/// A manually-driven clock.
///
/// Time only moves when [`set`][Self::set] or [`advance`][Self::advance] is called, which makes this useful for tests
/// and for replaying recorded event streams. Clones share the same underlying time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a new `ManualClock` set to the given time.
    pub fn new(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now: i64) {
        self.now.store(now, Relaxed);
    }

    /// Advances the current time by `delta`.
    pub fn advance(&self, delta: i64) {
        self.now.fetch_add(delta, Relaxed);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let mut last = clock.now();
        for _ in 0..1000 {
            let now = clock.now();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn unix_clock_is_after_2020() {
        assert!(UnixClock.now() > 1_577_836_800);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(10);
        let shared = clock.clone();
        clock.advance(5);
        assert_eq!(shared.now(), 15);
        shared.set(3);
        assert_eq!(clock.now(), 3);
    }
}
