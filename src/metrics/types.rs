/// fping's own per-target aggregate for one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSummary {
    pub loss_percent: u8,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
}

/// Everything published for one target.
///
/// `median_ms` is `None` without samples; `stdev_ms` is `None` without
/// samples and `0.0` with exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetReport {
    pub target: String,
    pub summary: RoundSummary,
    pub sample_count: usize,
    pub median_ms: Option<f64>,
    pub stdev_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundReport {
    pub targets: Vec<TargetReport>,
}

impl RoundReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }
}
