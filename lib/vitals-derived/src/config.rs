use serde::Deserialize;

use crate::SamplingError;

#[derive(Deserialize)]
#[serde(default)]
struct RawSamplingConfiguration {
    /// Probability that any given measurement is kept.
    ///
    /// Must be between 0.0 and 1.0 (inclusive). A rate of 0.0 never samples, and a rate of 1.0 always samples.
    ///
    /// Defaults to `1.0`.
    rate: f64,
}

impl Default for RawSamplingConfiguration {
    fn default() -> Self {
        Self { rate: 1.0 }
    }
}

/// Sampling configuration.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(try_from = "RawSamplingConfiguration")]
pub struct SamplingConfiguration {
    rate: f64,
}

impl SamplingConfiguration {
    /// Creates a new `SamplingConfiguration` with the given rate.
    ///
    /// # Errors
    ///
    /// If the rate is not between `0` and `1` (inclusive), an error is returned.
    pub fn new(rate: f64) -> Result<Self, SamplingError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(SamplingError::InvalidRate { rate });
        }

        Ok(Self { rate })
    }

    /// Returns the configured sampling rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Default for SamplingConfiguration {
    fn default() -> Self {
        Self { rate: 1.0 }
    }
}

impl TryFrom<RawSamplingConfiguration> for SamplingConfiguration {
    type Error = SamplingError;

    fn try_from(raw: RawSamplingConfiguration) -> Result<Self, Self::Error> {
        Self::new(raw.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_always_sampling() {
        let config: SamplingConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(config.rate(), 1.0);
    }

    #[test]
    fn boundaries() {
        assert!(SamplingConfiguration::new(0.0).is_ok());
        assert!(SamplingConfiguration::new(1.0).is_ok());
        assert!(SamplingConfiguration::new(-0.01).is_err());
        assert!(SamplingConfiguration::new(1.01).is_err());
        assert!(SamplingConfiguration::new(f64::NAN).is_err());
        assert!(serde_json::from_str::<SamplingConfiguration>(r#"{ "rate": 2.0 }"#).is_err());
    }
}
