//! Classifier for fping `-c` output.
//!
//! fping reports each reply on stdout and a per-target summary on stderr:
//!
//! ```text
//! <target> : [<seq>], <n> bytes, <rtt> ms (<avg> avg, <pct>% loss)
//! <target> : xmt/rcv/%loss = <sent>/<recv>/<loss>%, min/avg/max = <min>/<avg>/<max>
//! ```
//!
//! Those two shapes are the whole contract with the tool. Anything else,
//! including timeout lines and loss-only summaries, is ignored.

use crate::metrics::RoundSummary;

const TARGET_SEPARATOR: &str = " : ";
const SUMMARY_COUNTS: &str = "xmt/rcv/%loss = ";
const SUMMARY_RTTS: &str = "%, min/avg/max = ";

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeLine<'line> {
    Sample { target: &'line str, rtt_ms: f64 },
    Summary {
        target: &'line str,
        summary: RoundSummary,
    },
    Ignored,
}

/// Classifies a single line of probe output. Holds no state between calls.
#[must_use]
pub fn parse_line(line: &str) -> ProbeLine<'_> {
    let Some((target, rest)) = line.split_once(TARGET_SEPARATOR) else {
        return ProbeLine::Ignored;
    };
    // fping pads target names to a common width.
    let target = target.trim();
    if target.is_empty() || target.chars().any(char::is_whitespace) {
        return ProbeLine::Ignored;
    }
    let rest = rest.trim_end();

    if let Some(rtt_ms) = parse_sample(rest) {
        return ProbeLine::Sample { target, rtt_ms };
    }
    if let Some(summary) = parse_summary(rest) {
        return ProbeLine::Summary { target, summary };
    }
    ProbeLine::Ignored
}

fn parse_sample(rest: &str) -> Option<f64> {
    let rest = rest.strip_prefix('[')?;
    let (seq, rest) = rest.split_once("], ")?;
    parse_count(seq)?;
    let (bytes, rest) = rest.split_once(" bytes, ")?;
    parse_count(bytes)?;
    let (rtt, tail) = rest.split_once(" ms")?;
    if !(tail.is_empty() || tail.starts_with(' ')) {
        return None;
    }
    parse_ms(rtt)
}

fn parse_summary(rest: &str) -> Option<RoundSummary> {
    let rest = rest.strip_prefix(SUMMARY_COUNTS)?;
    let (counts, rtts) = rest.split_once(SUMMARY_RTTS)?;

    let mut counts = counts.split('/');
    parse_count(counts.next()?)?;
    parse_count(counts.next()?)?;
    let loss_percent: u8 = counts.next()?.parse().ok()?;
    if counts.next().is_some() || loss_percent > 100 {
        return None;
    }

    let mut rtts = rtts.split('/');
    let min_ms = parse_ms(rtts.next()?)?;
    let avg_ms = parse_ms(rtts.next()?)?;
    let max_ms = parse_ms(rtts.next()?)?;
    if rtts.next().is_some() {
        return None;
    }

    Some(RoundSummary {
        loss_percent,
        min_ms,
        avg_ms,
        max_ms,
    })
}

fn parse_count(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Plain decimal only; rejects `NaN`, `inf` and exponent forms that `f64`
/// parsing would otherwise accept.
fn parse_ms(value: &str) -> Option<f64> {
    let has_digit = value.bytes().any(|byte| byte.is_ascii_digit());
    let well_formed = value
        .bytes()
        .all(|byte| byte.is_ascii_digit() || byte == b'.');
    if !has_digit || !well_formed {
        return None;
    }
    value.parse().ok()
}
