/// Median of `samples`; the mean of the two middle values for even counts.
#[must_use]
pub fn median(samples: &[f64]) -> Option<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        return sorted.get(mid).copied();
    }
    let upper = sorted.get(mid)?;
    let lower = sorted.get(mid.checked_sub(1)?)?;
    Some((lower + upper) / 2.0)
}

/// Sample (n - 1) standard deviation.
///
/// A single sample has no spread and yields `0.0`; no samples yield `None`.
#[must_use]
pub fn sample_stdev(samples: &[f64]) -> Option<f64> {
    match samples.len() {
        0 => None,
        1 => Some(0.0),
        len => {
            let count = len as f64;
            let mean = samples.iter().sum::<f64>() / count;
            let squares: f64 = samples
                .iter()
                .map(|sample| (sample - mean).powi(2))
                .sum();
            Some((squares / (count - 1.0)).sqrt())
        }
    }
}
