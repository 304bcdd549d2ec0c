//! Per-round accumulation of probe results and their reduction to metrics.
mod aggregator;
mod stats;
mod types;


pub use aggregator::RoundAggregator;
pub use stats::{median, sample_stdev};
pub use types::{RoundReport, RoundSummary, TargetReport};
