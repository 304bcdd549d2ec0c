use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::error::SinkError;
use crate::metrics::{RoundReport, TargetReport};

use super::config::GraphiteConfig;
use super::format::format_target;
use super::{MetricsPublisher, PublishOutcome};

/// Graphite plaintext publisher; one connection per round.
#[derive(Debug, Clone)]
pub struct GraphitePublisher {
    config: GraphiteConfig,
}

impl GraphitePublisher {
    #[must_use]
    pub const fn new(config: GraphiteConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<TcpStream, SinkError> {
        TcpStream::connect((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|source| SinkError::Connect {
                addr: self.config.address(),
                source,
            })
    }
}

async fn send_target<W>(
    stream: &mut W,
    prefix: &str,
    target: &TargetReport,
    timestamp: i64,
) -> Result<(), SinkError>
where
    W: AsyncWrite + Unpin + Send,
{
    let payload = format_target(prefix, target, timestamp)?;
    stream
        .write_all(payload.as_bytes())
        .await
        .map_err(|source| SinkError::Send {
            target: target.target.clone(),
            source,
        })
}

/// Writes every target of `report` to `stream`.
///
/// A failed target is logged with its summary and the remaining targets are
/// still attempted.
pub(super) async fn deliver<W>(
    stream: &mut W,
    prefix: &str,
    report: &RoundReport,
    timestamp: i64,
) -> PublishOutcome
where
    W: AsyncWrite + Unpin + Send,
{
    let mut sent = 0_usize;
    let mut failed = 0_usize;
    for target in &report.targets {
        match send_target(stream, prefix, target, timestamp).await {
            Ok(()) => sent = sent.saturating_add(1),
            Err(err) => {
                let summary = &target.summary;
                warn!(
                    "{} (loss {}%, min/avg/max {:.2}/{:.2}/{:.2} ms)",
                    err, summary.loss_percent, summary.min_ms, summary.avg_ms, summary.max_ms
                );
                failed = failed.saturating_add(1);
            }
        }
    }
    PublishOutcome::Delivered { sent, failed }
}

#[async_trait]
impl MetricsPublisher for GraphitePublisher {
    async fn publish(&mut self, report: &RoundReport) -> PublishOutcome {
        if report.is_empty() {
            debug!("No summarised targets this round, nothing to publish.");
            return PublishOutcome::Empty;
        }

        let mut stream = match self.connect().await {
            Ok(stream) => stream,
            Err(err) => {
                warn!("Skipping round: {}", err);
                return PublishOutcome::Unreachable;
            }
        };

        let timestamp = chrono::Utc::now().timestamp();
        let outcome = deliver(&mut stream, &self.config.prefix, report, timestamp).await;

        if let Err(source) = stream.shutdown().await {
            debug!("{}", SinkError::Close { source });
        }
        debug!("Published to {}: {:?}", self.config.address(), outcome);
        outcome
    }
}
