//! Derived statistics: sampled latency measurement, and the observers that turn samples into windowed statistics.
//!
//! Samples flow in one direction: [`LatencySampling`] times an operation between a `begin` and an `end`, decides
//! whether to keep the measurement, and pushes kept measurements to every registered [`EventObserver`]. A
//! [`WindowedStatistic`] is one such observer, feeding each sample into an exponential histogram so that the number (or
//! sum) of samples over a trailing window can be read at any time.
#![deny(missing_docs)]

mod config;
pub use self::config::SamplingConfiguration;

mod error;
pub use self::error::SamplingError;

mod latency;
pub use self::latency::{LatencySampling, LatencyStart};

mod observer;
pub use self::observer::EventObserver;

pub mod time;

mod windowed;
pub use self::windowed::{WindowedMode, WindowedStatistic};
