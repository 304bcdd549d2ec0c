use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, ReadBuf};
use tokio::process::Command;

use super::runner::{ReadStep, StreamsEnd, consume_read, read_streams};
use super::*;
use crate::error::{AppError, AppResult, ProbeError};
use crate::metrics::{RoundAggregator, RoundSummary};
use crate::shutdown::shutdown_channel;

const RUN_TIMEOUT: Duration = Duration::from_secs(10);

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::probe(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn shell(script: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    command
}

#[test]
fn parse_line_classifies_reply() -> Result<(), String> {
    match parse_line("latinum : [0], 84 bytes, 6.46 ms (6.46 avg, 0% loss)") {
        ProbeLine::Sample {
            target: "latinum",
            rtt_ms,
        } if (rtt_ms - 6.46).abs() < f64::EPSILON => Ok(()),
        other => Err(format!("Unexpected classification: {:?}", other)),
    }
}

#[test]
fn parse_line_classifies_summary() -> Result<(), String> {
    let expected = RoundSummary {
        loss_percent: 0,
        min_ms: 6.46,
        avg_ms: 6.46,
        max_ms: 6.46,
    };
    match parse_line("latinum : xmt/rcv/%loss = 1/1/0%, min/avg/max = 6.46/6.46/6.46") {
        ProbeLine::Summary {
            target: "latinum",
            summary,
        } if summary == expected => Ok(()),
        other => Err(format!("Unexpected classification: {:?}", other)),
    }
}

#[test]
fn parse_line_trims_padded_targets() -> Result<(), String> {
    let sample = parse_line("a.example  : [1], 64 bytes, 12.5 ms (12.5 avg, 0% loss)");
    let summary =
        parse_line("a.example  : xmt/rcv/%loss = 20/19/5%, min/avg/max = 10.1/12.0/15.9");
    let checks = [
        (
            matches!(sample, ProbeLine::Sample { target: "a.example", .. }),
            "padded sample target",
        ),
        (
            matches!(
                summary,
                ProbeLine::Summary {
                    target: "a.example",
                    summary: RoundSummary { loss_percent: 5, .. },
                }
            ),
            "padded summary target",
        ),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(format!("Unexpected classification: {}", message));
        }
    }
    Ok(())
}

#[test]
fn parse_line_ignores_everything_else() -> Result<(), String> {
    let lines = [
        "",
        "garbage",
        "latinum : [2], timed out (6.46 avg, 33% loss)",
        "latinum : xmt/rcv/%loss = 3/0/100%",
        "latinum : xmt/rcv/%loss = 3/3/101%, min/avg/max = 1.0/1.0/1.0",
        "latinum : [0], 84 bytes, NaN ms (6.46 avg, 0% loss)",
        "latinum : [0], 84 bytes, inf ms (6.46 avg, 0% loss)",
        "latinum : [0], 84 bytes, 1e3 ms (6.46 avg, 0% loss)",
        "latinum : xmt/rcv/%loss = 1/1/0%, min/avg/max = NaN/6.46/6.46",
        "two words : [0], 84 bytes, 6.46 ms (6.46 avg, 0% loss)",
        " : [0], 84 bytes, 6.46 ms (6.46 avg, 0% loss)",
        "ICMP Host Unreachable from 10.0.0.1 for ICMP Echo sent to 10.0.0.2",
    ];
    for line in lines {
        let parsed = parse_line(line);
        if parsed != ProbeLine::Ignored {
            return Err(format!("Expected {:?} to be ignored, got {:?}", line, parsed));
        }
    }
    Ok(())
}

#[test]
fn probe_command_builds_fping_arguments() -> Result<(), String> {
    let command = ProbeCommand::new(
        "/usr/sbin/fping".into(),
        20,
        56,
        10,
        vec!["a.example".to_owned(), "b.example".to_owned()],
    );
    let arguments = command.arguments();
    let expected = [
        "-c", "20", "-b", "56", "-i", "10", "a.example", "b.example",
    ];
    if arguments != expected {
        return Err(format!("Unexpected arguments: {:?}", arguments));
    }

    let std_command = ProbeLauncher::command(&command);
    let program = std_command.as_std().get_program().to_owned();
    if program != "/usr/sbin/fping" {
        return Err(format!("Unexpected program: {:?}", program));
    }
    Ok(())
}

#[test]
fn run_probe_reads_both_streams_until_exit() -> AppResult<()> {
    run_async_test(async {
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut aggregator = RoundAggregator::new();
        let script = "echo 'latinum : [0], 84 bytes, 6.46 ms (6.46 avg, 0% loss)'; \
                      echo 'noise'; \
                      echo 'latinum : xmt/rcv/%loss = 1/1/0%, min/avg/max = 6.46/6.46/6.46' >&2";

        let outcome = tokio::time::timeout(
            RUN_TIMEOUT,
            run_probe(shell(script), &mut shutdown_rx, &mut aggregator),
        )
        .await
        .map_err(|err| AppError::probe(format!("Probe timed out: {}", err)))??;

        let checks = [
            (
                matches!(outcome, ProbeOutcome::Completed(status) if status.success()),
                "completed with success",
            ),
            (aggregator.samples("latinum").len() == 1, "one sample"),
            (aggregator.summary("latinum").is_some(), "summary recorded"),
        ];
        for (ok, message) in checks {
            if !ok {
                return Err(AppError::probe(format!("Unexpected result: {}", message)));
            }
        }
        Ok(())
    })
}

#[test]
fn run_probe_reports_failed_exit_status() -> AppResult<()> {
    run_async_test(async {
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut aggregator = RoundAggregator::new();
        let script = "echo 'latinum : xmt/rcv/%loss = 1/0/100%' >&2; exit 1";

        let outcome = run_probe(shell(script), &mut shutdown_rx, &mut aggregator).await?;
        match outcome {
            ProbeOutcome::Completed(status) if status.code() == Some(1) => Ok(()),
            other => Err(AppError::probe(format!("Unexpected outcome: {:?}", other))),
        }
    })
}

#[test]
fn run_probe_terminates_and_reaps_on_shutdown() -> AppResult<()> {
    run_async_test(async {
        let dir = tempfile::tempdir()?;
        let pid_path = dir.path().join("probe.pid");
        let script = format!(
            "echo 'alpha : [0], 84 bytes, 1.00 ms (1.00 avg, 0% loss)'; echo $$ > '{}'; exec sleep 30",
            pid_path.display()
        );
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut aggregator = RoundAggregator::new();

        let watch_path = pid_path.clone();
        let trigger = tokio::spawn(async move {
            while !watch_path.exists() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown_tx.send_replace(true);
            shutdown_tx
        });

        let outcome = tokio::time::timeout(
            RUN_TIMEOUT,
            run_probe(shell(&script), &mut shutdown_rx, &mut aggregator),
        )
        .await
        .map_err(|err| AppError::probe(format!("Probe ignored shutdown: {}", err)))??;
        let _shutdown_tx = trigger
            .await
            .map_err(|err| AppError::probe(format!("Trigger task failed: {}", err)))?;

        if outcome != ProbeOutcome::Stopped {
            return Err(AppError::probe(format!("Unexpected outcome: {:?}", outcome)));
        }

        let pid: libc::pid_t = std::fs::read_to_string(&pid_path)?
            .trim()
            .parse()
            .map_err(|err| AppError::probe(format!("Unreadable pid file: {}", err)))?;
        // SAFETY: signal 0 only checks for existence.
        let rc = unsafe { libc::kill(pid, 0) };
        let errno = std::io::Error::last_os_error().raw_os_error();
        if rc != -1 || errno != Some(libc::ESRCH) {
            return Err(AppError::probe(format!(
                "Probe pid {} still exists after shutdown",
                pid
            )));
        }
        Ok(())
    })
}

#[test]
fn run_probe_returns_immediately_when_already_stopped() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        shutdown_tx.send_replace(true);
        let mut aggregator = RoundAggregator::new();

        let outcome = tokio::time::timeout(
            RUN_TIMEOUT,
            run_probe(shell("exec sleep 30"), &mut shutdown_rx, &mut aggregator),
        )
        .await
        .map_err(|err| AppError::probe(format!("Probe ignored shutdown: {}", err)))??;
        if outcome != ProbeOutcome::Stopped {
            return Err(AppError::probe(format!("Unexpected outcome: {:?}", outcome)));
        }
        Ok(())
    })
}

#[test]
fn run_probe_reports_spawn_failure() -> AppResult<()> {
    run_async_test(async {
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut aggregator = RoundAggregator::new();
        let command = Command::new("/nonexistent/pingstat-probe");

        match run_probe(command, &mut shutdown_rx, &mut aggregator).await {
            Err(ProbeError::Spawn { program, .. })
                if program.as_os_str() == "/nonexistent/pingstat-probe" =>
            {
                Ok(())
            }
            Err(err) => Err(AppError::probe(format!("Unexpected error: {}", err))),
            Ok(outcome) => Err(AppError::probe(format!("Unexpected outcome: {:?}", outcome))),
        }
    })
}

/// Yields `data` once, then fails every read with `kind`.
struct FailAfter {
    data: Option<&'static [u8]>,
    kind: ErrorKind,
}

impl AsyncRead for FailAfter {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let kind = self.kind;
        match self.data.take() {
            Some(data) => {
                buf.put_slice(data);
                Poll::Ready(Ok(()))
            }
            None => Poll::Ready(Err(std::io::Error::from(kind))),
        }
    }
}

const LATINUM_SAMPLE: &[u8] = b"latinum : [0], 84 bytes, 6.46 ms (6.46 avg, 0% loss)\n";

#[test]
fn consume_read_records_complete_line() -> Result<(), String> {
    let mut aggregator = RoundAggregator::new();
    let mut line = LATINUM_SAMPLE.to_vec();
    let step = consume_read(Ok(line.len()), &mut line, "stdout", &mut aggregator);
    let checks = [
        (step == ReadStep::Continue, "stream stays open"),
        (line.is_empty(), "line buffer cleared"),
        (aggregator.samples("latinum").len() == 1, "sample recorded"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(format!("Unexpected read handling: {}", message));
        }
    }
    Ok(())
}

#[test]
fn consume_read_retries_interrupted_and_keeps_partial_line() -> Result<(), String> {
    let mut aggregator = RoundAggregator::new();
    let mut line = b"latinum : [0], 84 by".to_vec();
    let step = consume_read(
        Err(std::io::Error::from(ErrorKind::Interrupted)),
        &mut line,
        "stdout",
        &mut aggregator,
    );
    if step != ReadStep::Continue {
        return Err(format!("Expected retry, got {:?}", step));
    }
    if line != b"latinum : [0], 84 by" || !aggregator.is_empty() {
        return Err("Partial line must be kept for the next read".to_owned());
    }
    Ok(())
}

#[test]
fn consume_read_fails_stream_on_other_errors() -> Result<(), String> {
    let mut aggregator = RoundAggregator::new();
    let mut line = LATINUM_SAMPLE.to_vec();
    consume_read(Ok(line.len()), &mut line, "stdout", &mut aggregator);

    let step = consume_read(
        Err(std::io::Error::from(ErrorKind::InvalidData)),
        &mut line,
        "stdout",
        &mut aggregator,
    );
    if step != ReadStep::Failed {
        return Err(format!("Expected failure, got {:?}", step));
    }
    if aggregator.samples("latinum").len() != 1 {
        return Err("Committed lines must survive a read error".to_owned());
    }
    Ok(())
}

#[test]
fn consume_read_signals_eof_and_flushes_unterminated_line() -> Result<(), String> {
    let mut aggregator = RoundAggregator::new();
    let mut line = LATINUM_SAMPLE
        .strip_suffix(b"\n")
        .map(<[u8]>::to_vec)
        .unwrap_or_default();
    let step = consume_read(Ok(0), &mut line, "stdout", &mut aggregator);
    if step != ReadStep::Eof || aggregator.samples("latinum").len() != 1 {
        return Err(format!("Unexpected EOF handling: {:?}", step));
    }
    Ok(())
}

#[test]
fn read_error_on_one_stream_ends_the_whole_read() -> AppResult<()> {
    run_async_test(async {
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut aggregator = RoundAggregator::new();
        let failing = FailAfter {
            data: Some(LATINUM_SAMPLE),
            kind: ErrorKind::BrokenPipe,
        };
        // The writer half stays alive, so this stream never reaches EOF.
        let (_idle_writer, idle_reader) = tokio::io::duplex(64);

        let end = tokio::time::timeout(
            RUN_TIMEOUT,
            read_streams(idle_reader, failing, &mut shutdown_rx, &mut aggregator),
        )
        .await
        .map_err(|err| AppError::probe(format!("Read loop outlived the failure: {}", err)))?;

        if end != StreamsEnd::Failed {
            return Err(AppError::probe(format!("Unexpected end: {:?}", end)));
        }
        if aggregator.samples("latinum").len() != 1 {
            return Err(AppError::probe("Expected the line read before the error"));
        }
        Ok(())
    })
}

#[test]
fn run_probe_survives_invalid_utf8_and_full_pipes() -> AppResult<()> {
    run_async_test(async {
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut aggregator = RoundAggregator::new();
        let script = "printf 'x : junk \\377\\n'; \
                      i=0; while [ $i -lt 2000 ]; do \
                      echo 'latinum : [0], 84 bytes, 6.46 ms (6.46 avg, 0% loss)'; \
                      i=$((i + 1)); done; \
                      echo 'latinum : xmt/rcv/%loss = 2000/2000/0%, min/avg/max = 6.46/6.46/6.46' >&2";

        let outcome = tokio::time::timeout(
            RUN_TIMEOUT,
            run_probe(shell(script), &mut shutdown_rx, &mut aggregator),
        )
        .await
        .map_err(|err| AppError::probe(format!("Probe round hung: {}", err)))??;

        let checks = [
            (
                matches!(outcome, ProbeOutcome::Completed(status) if status.success()),
                "completed with success",
            ),
            (aggregator.samples("latinum").len() == 2000, "every sample kept"),
            (aggregator.summary("latinum").is_some(), "summary recorded"),
        ];
        for (ok, message) in checks {
            if !ok {
                return Err(AppError::probe(format!(
                    "Unexpected result: {} ({} samples)",
                    message,
                    aggregator.samples("latinum").len()
                )));
            }
        }
        Ok(())
    })
}
