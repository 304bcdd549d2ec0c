use std::time::Duration;

use chrono::Timelike;
use tracing::{debug, info, warn};

use crate::metrics::{RoundAggregator, RoundReport};
use crate::probe::{ProbeLauncher, ProbeOutcome, run_probe};
use crate::shutdown::{ShutdownReceiver, is_shutdown, wait_for_shutdown};
use crate::sinks::{MetricsPublisher, PublishOutcome};

const SECONDS_PER_MINUTE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    RunningProbe,
    Aggregating,
    Publishing,
    Sleeping,
    Stopped,
}

/// Seconds to sleep from `second` (0..=60, leap second included) to the next
/// minute boundary. Never zero.
#[must_use]
pub fn seconds_until_next_minute(second: u32) -> u64 {
    u64::from(SECONDS_PER_MINUTE.saturating_sub(second.min(SECONDS_PER_MINUTE - 1)))
}

/// Drives probe rounds once per minute until shutdown.
pub struct Scheduler<L, P> {
    launcher: L,
    publisher: P,
    targets: Vec<String>,
    aggregator: RoundAggregator,
    report: RoundReport,
    shutdown_rx: ShutdownReceiver,
}

impl<L, P> Scheduler<L, P>
where
    L: ProbeLauncher,
    P: MetricsPublisher,
{
    #[must_use]
    pub fn new(
        launcher: L,
        publisher: P,
        targets: Vec<String>,
        shutdown_rx: ShutdownReceiver,
    ) -> Self {
        Self {
            launcher,
            publisher,
            targets,
            aggregator: RoundAggregator::new(),
            report: RoundReport::default(),
            shutdown_rx,
        }
    }

    pub async fn run(&mut self) {
        let mut state = CycleState::Idle;
        while state != CycleState::Stopped {
            state = self.step(state).await;
        }
        info!("Scheduler stopped.");
    }

    /// Performs the work of `state` and returns the next state.
    ///
    /// Shutdown is checked after every state and wins over the natural
    /// transition.
    pub async fn step(&mut self, state: CycleState) -> CycleState {
        let next = match state {
            CycleState::Idle => CycleState::RunningProbe,
            CycleState::RunningProbe => self.probe_round().await,
            CycleState::Aggregating => {
                self.report = self.aggregator.report(&self.targets);
                debug!("Round produced reports for {} targets.", self.report.len());
                CycleState::Publishing
            }
            CycleState::Publishing => {
                if let PublishOutcome::Delivered { failed, .. } =
                    self.publisher.publish(&self.report).await
                    && failed > 0
                {
                    warn!("{} targets failed to publish this round.", failed);
                }
                CycleState::Sleeping
            }
            CycleState::Sleeping => self.sleep_until_next_minute().await,
            CycleState::Stopped => CycleState::Stopped,
        };

        if is_shutdown(&self.shutdown_rx) {
            if next != CycleState::Stopped {
                debug!("Shutdown requested after {:?}.", state);
            }
            return CycleState::Stopped;
        }
        next
    }

    #[must_use]
    pub const fn aggregator(&self) -> &RoundAggregator {
        &self.aggregator
    }

    #[must_use]
    pub const fn report(&self) -> &RoundReport {
        &self.report
    }

    async fn probe_round(&mut self) -> CycleState {
        self.aggregator.reset();
        self.report = RoundReport::default();

        let command = self.launcher.command();
        match run_probe(command, &mut self.shutdown_rx, &mut self.aggregator).await {
            Ok(ProbeOutcome::Completed(_)) => CycleState::Aggregating,
            Ok(ProbeOutcome::Stopped) => {
                info!("Round abandoned on shutdown.");
                CycleState::Stopped
            }
            Err(err) => {
                warn!("Probe round failed: {}", err);
                CycleState::Aggregating
            }
        }
    }

    async fn sleep_until_next_minute(&mut self) -> CycleState {
        let seconds = seconds_until_next_minute(chrono::Utc::now().second());
        debug!("Sleeping {}s until the next minute.", seconds);
        tokio::select! {
            () = tokio::time::sleep(Duration::from_secs(seconds)) => CycleState::Idle,
            () = wait_for_shutdown(&mut self.shutdown_rx) => CycleState::Stopped,
        }
    }
}
