use std::fmt::Write as _;

use crate::error::SinkError;
use crate::metrics::TargetReport;

fn write_line(output: &mut String, line: &str) -> Result<(), SinkError> {
    writeln!(output, "{}", line).map_err(|err| SinkError::WriteLine { source: err })
}

fn format_ms(value: f64) -> String {
    format!("{:.2}", value)
}

/// `<prefix>.<target with dots as underscores>.<suffix>`
#[must_use]
pub fn metric_path(prefix: &str, target: &str, suffix: &str) -> String {
    format!("{}.{}.{}", prefix, target.replace('.', "_"), suffix)
}

/// Plaintext lines for one target, newline terminated.
///
/// Median and stdev lines are left out when the round had no samples.
///
/// # Errors
///
/// Returns an error if the output buffer cannot be written.
pub(super) fn format_target(
    prefix: &str,
    report: &TargetReport,
    timestamp: i64,
) -> Result<String, SinkError> {
    let summary = &report.summary;
    let mut values = vec![
        ("packetloss", summary.loss_percent.to_string()),
        ("minrtt", format_ms(summary.min_ms)),
        ("avgrtt", format_ms(summary.avg_ms)),
        ("maxrtt", format_ms(summary.max_ms)),
    ];
    if let Some(median) = report.median_ms {
        values.push(("medianrtt", format_ms(median)));
    }
    if let Some(stdev) = report.stdev_ms {
        values.push(("stdevrtt", format_ms(stdev)));
    }

    let mut output = String::new();
    for (suffix, value) in values {
        write_line(
            &mut output,
            &format!(
                "{} {} {}",
                metric_path(prefix, &report.target, suffix),
                value,
                timestamp
            ),
        )?;
    }
    Ok(output)
}
