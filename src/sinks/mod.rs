//! Delivery of round reports to a Graphite plaintext listener.
mod config;
mod format;
mod writers;


use async_trait::async_trait;

use crate::metrics::RoundReport;

pub use config::GraphiteConfig;
pub use format::metric_path;
pub use writers::GraphitePublisher;

/// What happened to one round's metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Nothing to send; no connection was opened.
    Empty,
    /// The sink could not be reached; the round was skipped.
    Unreachable,
    Delivered { sent: usize, failed: usize },
}

/// Sends a round report somewhere. Failures are logged, never returned.
#[async_trait]
pub trait MetricsPublisher: Send {
    async fn publish(&mut self, report: &RoundReport) -> PublishOutcome;
}
