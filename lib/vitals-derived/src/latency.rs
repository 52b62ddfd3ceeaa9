use std::{collections::HashMap, fmt, hash::Hash, ptr, sync::Arc, time::Instant};

use rand::{rngs::SmallRng, Rng as _, SeedableRng as _};
use tracing::trace;

use crate::{EventObserver, SamplingConfiguration, SamplingError};

/// The start of a timed operation.
///
/// Returned by [`LatencySampling::begin`], and handed back to [`LatencySampling::end`] once the operation completes.
/// Overlapping operations each hold their own `LatencyStart`, so they never interfere with each other.
#[derive(Clone, Copy, Debug)]
#[must_use = "a latency measurement is only taken when the start is passed to `end`"]
pub struct LatencyStart {
    started: Instant,
}

impl LatencyStart {
    fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Sampled latency measurement.
///
/// Measures the time between [`begin`][Self::begin] and [`end`][Self::end], and passes the elapsed time, in
/// nanoseconds, to every registered observer. Each operation ends with a "kind" (for example, hit or miss), and only
/// kinds that were configured with a sampling rate are ever reported. For those, a uniformly random draw decides
/// whether the measurement is kept: a rate of `0.0` never keeps a measurement, a rate of `1.0` always does, and
/// anything in between keeps that fraction of measurements on average. Discarded measurements are dropped silently.
///
/// `LatencySampling` does no locking of its own: ending an operation needs exclusive access, as it advances the
/// sampler's random number generator.
pub struct LatencySampling<K> {
    rates: HashMap<K, f64>,
    observers: Vec<Arc<dyn EventObserver>>,
    rng: SmallRng,
}

impl<K> LatencySampling<K>
where
    K: Eq + Hash,
{
    /// Creates a new `LatencySampling` that samples all of the given kinds at the same rate.
    ///
    /// # Errors
    ///
    /// If the rate is not between `0` and `1` (inclusive), an error is returned.
    pub fn new<I>(kinds: I, rate: f64) -> Result<Self, SamplingError>
    where
        I: IntoIterator<Item = K>,
    {
        let config = SamplingConfiguration::new(rate)?;
        Ok(Self::from_configuration(kinds, &config))
    }

    /// Creates a new `LatencySampling` that samples all of the given kinds at the configured rate.
    pub fn from_configuration<I>(kinds: I, config: &SamplingConfiguration) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self {
            rates: kinds.into_iter().map(|kind| (kind, config.rate())).collect(),
            observers: Vec::new(),
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// Sets the sampling rate for a single kind, overriding any existing rate for it.
    ///
    /// # Errors
    ///
    /// If the rate is not between `0` and `1` (inclusive), an error is returned.
    pub fn with_rate(mut self, kind: K, rate: f64) -> Result<Self, SamplingError> {
        let config = SamplingConfiguration::new(rate)?;
        self.rates.insert(kind, config.rate());
        Ok(self)
    }

    /// Sets the random number generator used to make sampling decisions.
    ///
    /// Useful for testing purposes, where a seeded generator makes sampling decisions reproducible.
    ///
    /// Defaults to a small, fast generator seeded from the thread-local generator.
    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = rng;
        self
    }

    /// Returns the sampling rate for the given kind, if it is sampled at all.
    pub fn rate(&self, kind: &K) -> Option<f64> {
        self.rates.get(kind).copied()
    }

    /// Registers an observer to receive sampled measurements.
    pub fn add_derived_statistic(&mut self, observer: Arc<dyn EventObserver>) {
        self.observers.push(observer);
    }

    /// Unregisters an observer.
    ///
    /// Returns `true` if the observer was registered.
    pub fn remove_derived_statistic(&mut self, observer: &Arc<dyn EventObserver>) -> bool {
        let before = self.observers.len();
        self.observers
            .retain(|existing| !ptr::addr_eq(Arc::as_ptr(existing), Arc::as_ptr(observer)));
        self.observers.len() != before
    }

    /// Returns the number of registered observers.
    pub fn derived_statistics(&self) -> usize {
        self.observers.len()
    }

    /// Marks the start of an operation.
    pub fn begin(&self) -> LatencyStart {
        LatencyStart {
            started: Instant::now(),
        }
    }

    /// Marks the end of an operation, with the given kind.
    ///
    /// Returns `true` if the measurement was sampled and passed to the observers.
    pub fn end(&mut self, start: LatencyStart, kind: K) -> bool {
        let elapsed = start.elapsed_nanos();

        let Some(rate) = self.rates.get(&kind).copied() else {
            return false;
        };

        let draw = self.rng.random::<f64>();
        if draw >= rate {
            trace!(elapsed, rate, "Discarded latency measurement.");
            return false;
        }

        let parameters = [elapsed];
        for observer in &self.observers {
            observer.on_event(&parameters);
        }
        true
    }
}

impl<K> fmt::Debug for LatencySampling<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatencySampling")
            .field("rates", &self.rates)
            .field("observers", &self.observers.len())
            .finish()
    }
}
