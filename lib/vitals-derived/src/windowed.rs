use std::sync::{Mutex, MutexGuard, PoisonError};

use exponential_histogram::ExponentialHistogram;

use crate::{
    time::{MonotonicClock, TimeSource},
    EventObserver,
};

/// What a [`WindowedStatistic`] accumulates for each event.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowedMode {
    /// Counts events: each event adds one.
    Count,

    /// Sums event values: each event adds its first parameter (for latencies, the elapsed nanoseconds).
    Sum,
}

/// A statistic over a trailing window, fed by sampled events.
///
/// Every event is inserted into an [`ExponentialHistogram`] at the current time of the statistic's [`TimeSource`], so
/// the histogram's window must be expressed in the time source's unit (nanoseconds for [`MonotonicClock`]).
///
/// The histogram sits behind a mutex, so the statistic can be shared between the thread producing events and a
/// reporting thread reading the current value.
#[derive(Debug)]
pub struct WindowedStatistic<T = MonotonicClock> {
    mode: WindowedMode,
    histogram: Mutex<ExponentialHistogram>,
    time_source: T,
}

impl WindowedStatistic<MonotonicClock> {
    /// Creates a new `WindowedStatistic` backed by the given histogram, timestamped by a new monotonic clock.
    pub fn monotonic(mode: WindowedMode, histogram: ExponentialHistogram) -> Self {
        Self::new(mode, histogram, MonotonicClock::new())
    }
}

impl<T> WindowedStatistic<T>
where
    T: TimeSource,
{
    /// Creates a new `WindowedStatistic` backed by the given histogram and time source.
    pub fn new(mode: WindowedMode, histogram: ExponentialHistogram, time_source: T) -> Self {
        Self {
            mode,
            histogram: Mutex::new(histogram),
            time_source,
        }
    }

    fn histogram(&self) -> MutexGuard<'_, ExponentialHistogram> {
        // Nothing that runs under the lock can leave the histogram half-updated, so a poisoned lock is still usable.
        self.histogram.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns what this statistic accumulates for each event.
    pub fn mode(&self) -> WindowedMode {
        self.mode
    }

    /// Returns the current value of the statistic.
    ///
    /// Elements that have left the window as of the time source's current time are expired first.
    pub fn value(&self) -> u64 {
        let now = self.time_source.now();
        let mut histogram = self.histogram();
        histogram.expire(now);
        histogram.count()
    }

    /// Returns a copy of the underlying histogram, as it currently stands.
    pub fn snapshot(&self) -> ExponentialHistogram {
        self.histogram().clone()
    }

    /// Merges the given histogram into this statistic.
    ///
    /// This allows aggregating statistics that were accumulated separately, such as one per worker thread.
    pub fn merge_from(&self, other: &ExponentialHistogram) {
        self.histogram().merge(other);
    }
}

impl<T> EventObserver for WindowedStatistic<T>
where
    T: TimeSource,
{
    fn on_event(&self, parameters: &[u64]) {
        let count = match self.mode {
            WindowedMode::Count => 1,
            WindowedMode::Sum => parameters.first().copied().unwrap_or(0),
        };

        let now = self.time_source.now();
        self.histogram().insert_many(now, count);
    }
}
