use serde::Deserialize;

use crate::{ExponentialHistogram, HistogramError, Window};

const fn default_accuracy() -> f64 {
    0.01
}

#[derive(Deserialize)]
#[serde(default)]
struct RawHistogramConfiguration {
    /// Relative accuracy of the histogram.
    ///
    /// Must be between 0.0 and 1.0 (exclusive). Smaller values are more precise, at the cost of more buckets.
    ///
    /// Defaults to `0.01`.
    accuracy: f64,

    /// Length of the trailing window, in the same unit as the timestamps that will be inserted.
    ///
    /// Defaults to no window, which means elements never expire.
    window: Option<u64>,
}

impl Default for RawHistogramConfiguration {
    fn default() -> Self {
        Self {
            accuracy: default_accuracy(),
            window: None,
        }
    }
}

/// Histogram configuration.
///
/// Can be deserialized, in which case the accuracy is validated up front:
///
/// ```
/// use exponential_histogram::{HistogramConfiguration, Window};
///
/// let config: HistogramConfiguration = serde_json::from_str(r#"{ "accuracy": 0.05, "window": 60 }"#).unwrap();
/// assert_eq!(config.window(), Window::Bounded(60));
///
/// let histogram = config.build();
/// assert!(histogram.is_empty());
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(try_from = "RawHistogramConfiguration")]
pub struct HistogramConfiguration {
    accuracy: f64,
    window: Window,
}

impl HistogramConfiguration {
    /// Creates a new `HistogramConfiguration`.
    ///
    /// # Errors
    ///
    /// If the accuracy is not between `0` and `1` (exclusive), an error is returned.
    pub fn new(accuracy: f64, window: Window) -> Result<Self, HistogramError> {
        if !(accuracy > 0.0 && accuracy < 1.0) {
            return Err(HistogramError::InvalidAccuracy { accuracy });
        }

        Ok(Self { accuracy, window })
    }

    /// Returns the configured accuracy.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Returns the configured window.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Builds an empty histogram from this configuration.
    pub fn build(&self) -> ExponentialHistogram {
        ExponentialHistogram::from_configuration(self)
    }
}

impl Default for HistogramConfiguration {
    fn default() -> Self {
        Self {
            accuracy: default_accuracy(),
            window: Window::Unbounded,
        }
    }
}

impl TryFrom<RawHistogramConfiguration> for HistogramConfiguration {
    type Error = HistogramError;

    fn try_from(raw: RawHistogramConfiguration) -> Result<Self, Self::Error> {
        let window = raw.window.map_or(Window::Unbounded, Window::Bounded);
        Self::new(raw.accuracy, window)
    }
}
