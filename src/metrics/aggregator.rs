use std::collections::{HashMap, HashSet};

use crate::probe::ProbeLine;

use super::stats::{median, sample_stdev};
use super::types::{RoundReport, RoundSummary, TargetReport};

/// Samples and summaries collected during one probe round.
///
/// Owned by the scheduler and only touched from the worker task.
#[derive(Debug, Default)]
pub struct RoundAggregator {
    samples: HashMap<String, Vec<f64>>,
    summaries: HashMap<String, RoundSummary>,
    summary_order: Vec<String>,
}

impl RoundAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything from the previous round.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.summaries.clear();
        self.summary_order.clear();
    }

    /// Stores a parsed line. Returns `false` for ignored lines.
    pub fn record(&mut self, line: ProbeLine<'_>) -> bool {
        match line {
            ProbeLine::Sample { target, rtt_ms } => {
                self.add_sample(target, rtt_ms);
                true
            }
            ProbeLine::Summary { target, summary } => {
                self.set_summary(target, summary);
                true
            }
            ProbeLine::Ignored => false,
        }
    }

    pub fn add_sample(&mut self, target: &str, rtt_ms: f64) {
        self.samples
            .entry(target.to_owned())
            .or_default()
            .push(rtt_ms);
    }

    /// Last write wins; fping normally prints one summary per target.
    pub fn set_summary(&mut self, target: &str, summary: RoundSummary) {
        if self
            .summaries
            .insert(target.to_owned(), summary)
            .is_none()
        {
            self.summary_order.push(target.to_owned());
        }
    }

    #[must_use]
    pub fn samples(&self, target: &str) -> &[f64] {
        self.samples
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn summary(&self, target: &str) -> Option<&RoundSummary> {
        self.summaries.get(target)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.summaries.is_empty()
    }

    /// Reduces the round to one report per summarised target.
    ///
    /// Targets come out in `targets` order, followed by any other summarised
    /// targets in the order fping reported them. Targets without a summary
    /// are left out even when they have samples.
    #[must_use]
    pub fn report(&self, targets: &[String]) -> RoundReport {
        let mut seen = HashSet::new();
        let reports = targets
            .iter()
            .chain(&self.summary_order)
            .filter(|target| seen.insert(*target))
            .filter_map(|target| self.target_report(target))
            .collect();
        RoundReport { targets: reports }
    }

    fn target_report(&self, target: &str) -> Option<TargetReport> {
        let summary = *self.summaries.get(target)?;
        let samples = self.samples(target);
        Some(TargetReport {
            target: target.to_owned(),
            summary,
            sample_count: samples.len(),
            median_ms: median(samples),
            stdev_ms: sample_stdev(samples),
        })
    }
}
