use snafu::Snafu;

/// Errors that can occur when configuring or operating on a histogram.
#[derive(Clone, Debug, PartialEq, Snafu)]
pub enum HistogramError {
    /// The accuracy was not between 0.0 and 1.0 (exclusive).
    #[snafu(display("Accuracy must be between 0.0 and 1.0 exclusive, got {}.", accuracy))]
    InvalidAccuracy {
        /// The rejected accuracy.
        accuracy: f64,
    },

    /// The split fraction was not between 0.0 and 1.0 (inclusive).
    #[snafu(display("Split fraction must be between 0.0 and 1.0 inclusive, got {}.", fraction))]
    InvalidSplitFraction {
        /// The rejected fraction.
        fraction: f64,
    },
}
