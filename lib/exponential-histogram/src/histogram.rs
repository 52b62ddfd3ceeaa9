//! Sliding-window counting on top of the bucket ledger.

use std::fmt;

use tracing::{debug, warn};

use crate::{
    ledger::{Bucket, Ledger},
    HistogramConfiguration, HistogramError,
};

/// Length of the trailing window tracked by a histogram.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Window {
    /// Only elements from the most recent `n` time units are counted.
    Bounded(u64),

    /// Elements are never expired.
    Unbounded,
}

impl Window {
    /// Returns the oldest timestamp still inside the window when the current time is `now`.
    ///
    /// A window of `n` time units covers `(now - n, now]`. Returns `None` when nothing can have expired yet.
    fn oldest_retained(&self, now: i64) -> Option<i64> {
        match self {
            Window::Bounded(length) => now.checked_sub_unsigned(*length).map(|edge| edge.saturating_add(1)),
            Window::Unbounded => None,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Bounded(length) => write!(f, "{}", length),
            Window::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Returns the per-level bucket capacity for the given accuracy: `k = ceil(1/accuracy)`.
fn level_capacity(accuracy: f64) -> usize {
    // Float-to-int casts saturate, so vanishingly small accuracies just get a (very) large capacity.
    (1.0 / accuracy).ceil() as usize
}

/// An approximate counter over a sliding time window.
///
/// `ExponentialHistogram` counts how many elements were inserted during the last `W` time units, using space
/// logarithmic in the count, and guarantees that the reported count is within a relative error of `accuracy` of the
/// exact count. It supports bulk insertion, merging (for example, to combine per-thread histograms), and splitting.
///
/// Elements are tracked in buckets whose sizes are powers of two. Each bucket only remembers the timestamp of its most
/// recent element, and at most `k = ceil(1/accuracy)` buckets (`k + 1` for unit buckets) of any given size are kept.
/// When a size class overflows, its two oldest buckets are merged into a single bucket of twice the size. The oldest
/// bucket is the only one that can straddle the edge of the window, so only half of it is counted.
///
/// # Timestamps
///
/// Timestamps are plain signed integers in whatever unit the caller chooses, and must be supplied in non-decreasing
/// order. This is not checked: out-of-order timestamps never cause a panic, but the error bound no longer holds.
///
/// # Expiration
///
/// Inserting never expires anything. Callers must call [`expire`][Self::expire] with the current time before reading
/// [`count`][Self::count] if they want the count to reflect the current window.
///
/// # Memory
///
/// Smaller accuracies keep more buckets per size class. As the accuracy approaches zero, the histogram degrades towards
/// exact counting, with memory usage growing accordingly.
///
/// # Example
///
/// ```
/// use exponential_histogram::{ExponentialHistogram, Window};
///
/// let mut histogram = ExponentialHistogram::new(0.1, Window::Bounded(60)).unwrap();
/// histogram.insert(10);
/// histogram.insert_many(20, 5);
///
/// histogram.expire(75);
/// assert_eq!(histogram.count(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct ExponentialHistogram {
    accuracy: f64,
    window: Window,
    ledger: Ledger,
}

impl ExponentialHistogram {
    /// Creates a new `ExponentialHistogram` with the given accuracy and window.
    ///
    /// # Errors
    ///
    /// If the accuracy is not between `0` and `1` (exclusive), an error is returned.
    pub fn new(accuracy: f64, window: Window) -> Result<Self, HistogramError> {
        if !(accuracy > 0.0 && accuracy < 1.0) {
            return Err(HistogramError::InvalidAccuracy { accuracy });
        }

        Ok(Self {
            accuracy,
            window,
            ledger: Ledger::new(level_capacity(accuracy)),
        })
    }

    /// Creates a new `ExponentialHistogram` with the given accuracy that never expires elements.
    ///
    /// # Errors
    ///
    /// If the accuracy is not between `0` and `1` (exclusive), an error is returned.
    pub fn unbounded(accuracy: f64) -> Result<Self, HistogramError> {
        Self::new(accuracy, Window::Unbounded)
    }

    /// Creates a new `ExponentialHistogram` from an already-validated configuration.
    pub fn from_configuration(config: &HistogramConfiguration) -> Self {
        Self {
            accuracy: config.accuracy(),
            window: config.window(),
            ledger: Ledger::new(level_capacity(config.accuracy())),
        }
    }

    /// Returns the relative accuracy of this histogram.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Returns the window of this histogram.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Inserts a single element at `timestamp`.
    pub fn insert(&mut self, timestamp: i64) {
        self.insert_many(timestamp, 1);
    }

    /// Inserts `count` elements at `timestamp`.
    ///
    /// This does not loop `count` times: the equivalent set of buckets is built directly, so inserting a large count is
    /// about as cheap as inserting a small one. Inserting a count of zero does nothing.
    pub fn insert_many(&mut self, timestamp: i64, count: u64) {
        match count {
            0 => {}
            1 => self.ledger.add_unit(0, timestamp),
            _ => self.ledger.add_many(timestamp, count),
        }
    }

    /// Expires all elements that fall outside of the window as of `now`.
    ///
    /// Does nothing if the window is unbounded.
    pub fn expire(&mut self, now: i64) {
        let Some(cutoff) = self.window.oldest_retained(now) else {
            return;
        };

        let expired = self.ledger.drop_older_than(cutoff);
        if expired > 0 {
            debug!(now, cutoff, expired, remaining = self.ledger.total_weight(), "Expired buckets.");
        }
    }

    /// Returns the approximate number of elements in the histogram.
    ///
    /// This counts every bucket in full except for the oldest one, of which only half is counted.
    pub fn count(&self) -> u64 {
        self.ledger.total_weight() - self.ledger.oldest_weight() / 2
    }

    /// Returns the total weight of all buckets in the histogram.
    ///
    /// Unlike [`count`][Self::count], this counts the oldest bucket in full, and is exactly additive across merges and
    /// splits.
    pub fn total_weight(&self) -> u64 {
        self.ledger.total_weight()
    }

    /// Returns `true` if the histogram is empty.
    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Returns the number of buckets currently held.
    pub fn bucket_count(&self) -> usize {
        self.ledger.bucket_count()
    }

    /// Returns an iterator over the buckets of this histogram, most recent first.
    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.ledger.buckets()
    }

    /// Removes all elements from the histogram.
    pub fn clear(&mut self) {
        self.ledger.clear();
    }

    /// Merges another histogram into this one.
    ///
    /// `other` is left untouched. The merged histogram keeps this histogram's accuracy and window, and its buckets are
    /// compacted to respect this histogram's accuracy. When the two accuracies differ, the error bound of the result is
    /// governed by the larger of the two.
    ///
    /// Merging histograms with different windows is allowed, but logged as a warning, since it is no longer clear which
    /// window the merged elements belong to.
    pub fn merge(&mut self, other: &Self) {
        // Log-only: the merge itself proceeds the same way for either window.
        if self.window != other.window {
            warn!(
                receiver_window = %self.window,
                other_window = %other.window,
                "Merging histograms with different windows. Keeping the receiver's window."
            );
        }

        if other.is_empty() {
            return;
        }

        self.ledger.merge(&other.ledger);
    }

    /// Splits off roughly `fraction` of this histogram's elements into a new histogram.
    ///
    /// The new histogram has the same accuracy and window as this one. Buckets are moved whole, largest (and so oldest)
    /// first, so the split can only be as precise as the bucket sizes allow. The total weight of both histograms always
    /// adds up to the total weight before the split.
    ///
    /// # Errors
    ///
    /// If `fraction` is not between `0` and `1` (inclusive), an error is returned.
    pub fn split(&mut self, fraction: f64) -> Result<Self, HistogramError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(HistogramError::InvalidSplitFraction { fraction });
        }

        let ledger = self.ledger.split_by_count(fraction);
        debug!(
            fraction,
            split_weight = ledger.total_weight(),
            remaining_weight = self.ledger.total_weight(),
            "Split histogram."
        );

        Ok(Self {
            accuracy: self.accuracy,
            window: self.window,
            ledger,
        })
    }
}

impl fmt::Display for ExponentialHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "count = {} : ", self.count())?;
        for (i, bucket) in self.buckets().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", bucket)?;
        }
        Ok(())
    }
}
