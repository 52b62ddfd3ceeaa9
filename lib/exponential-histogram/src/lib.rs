//! A sliding-window approximate counter based on exponential histograms.
//!
//! [`ExponentialHistogram`] answers "how many elements were inserted during the last `W` time units?" with a bounded
//! relative error, using memory logarithmic in the number of elements. It backs windowed statistics such as event
//! rates and latency sums, and supports merging and splitting so that per-thread histograms can be combined, or a
//! histogram can be partitioned when windows are reorganized.
//!
//! The algorithm follows Datar, Gionis, Indyk and Motwani, "Maintaining Stream Statistics over Sliding Windows".
#![deny(missing_docs)]

mod config;
pub use self::config::HistogramConfiguration;

mod error;
pub use self::error::HistogramError;

mod histogram;
pub use self::histogram::{ExponentialHistogram, Window};

mod ledger;
pub use self::ledger::Bucket;
