use snafu::Snafu;

/// Errors that can occur when configuring sampling.
#[derive(Clone, Debug, PartialEq, Snafu)]
pub enum SamplingError {
    /// The sampling rate was not between 0.0 and 1.0 (inclusive).
    #[snafu(display("Sampling rate must be between 0.0 and 1.0 inclusive, got {}.", rate))]
    InvalidRate {
        /// The rejected rate.
        rate: f64,
    },
}
