use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::ProbeError;
use crate::metrics::RoundAggregator;
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};

use super::parser::parse_line;

/// Time a probe gets to exit after SIGTERM before it is killed outright.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Output reached EOF and the process was reaped.
    Completed(ExitStatus),
    /// Shutdown was requested mid-round; the process was terminated and reaped.
    Stopped,
}

/// How reading the probe output ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StreamsEnd {
    /// Both streams reached EOF.
    Eof,
    /// A stream failed to read; the rest of the round's output is dropped.
    Failed,
    /// Shutdown was requested.
    Stopped,
}

/// What to do with a stream after one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ReadStep {
    Continue,
    Eof,
    Failed,
}

/// Runs one probe round, feeding every output line into `aggregator`.
///
/// stdout and stderr are read concurrently; fping prints replies on one and
/// summaries on the other, and the parser does not depend on their relative
/// order.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned, waited on, or
/// terminated. Lines parsed before the error stay in `aggregator`.
pub async fn run_probe(
    mut command: Command,
    shutdown_rx: &mut ShutdownReceiver,
    aggregator: &mut RoundAggregator,
) -> Result<ProbeOutcome, ProbeError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let program = command.as_std().get_program().to_owned();
    let mut child = command.spawn().map_err(|err| ProbeError::Spawn {
        program: program.into(),
        source: err,
    })?;
    debug!("Probe started with pid {:?}", child.id());

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        terminate(&mut child).await?;
        return Err(ProbeError::MissingPipe {
            stream: "stdout/stderr",
        });
    };

    let status = match read_streams(stdout, stderr, shutdown_rx, aggregator).await {
        StreamsEnd::Stopped => {
            info!("Shutdown requested, terminating probe.");
            terminate(&mut child).await?;
            return Ok(ProbeOutcome::Stopped);
        }
        StreamsEnd::Failed => {
            warn!("Probe output became unreadable, ending the round early.");
            terminate(&mut child).await?
        }
        StreamsEnd::Eof => child
            .wait()
            .await
            .map_err(|err| ProbeError::Wait { source: err })?,
    };
    if status.success() {
        debug!("Probe exited with {}", status);
    } else {
        warn!("Probe exited with {}", status);
    }
    Ok(ProbeOutcome::Completed(status))
}

/// Reads both streams line by line until both hit EOF, one fails, or
/// shutdown is requested. The readers are dropped on return.
pub(super) async fn read_streams<O, E>(
    stdout: O,
    stderr: E,
    shutdown_rx: &mut ShutdownReceiver,
    aggregator: &mut RoundAggregator,
) -> StreamsEnd
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    // Partial lines survive a cancelled `read_until` in these buffers.
    let mut stdout_line = Vec::new();
    let mut stderr_line = Vec::new();
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        let step = tokio::select! {
            biased;
            () = wait_for_shutdown(shutdown_rx) => return StreamsEnd::Stopped,
            read = stdout.read_until(b'\n', &mut stdout_line), if stdout_open => {
                let step = consume_read(read, &mut stdout_line, "stdout", aggregator);
                stdout_open = step == ReadStep::Continue;
                step
            }
            read = stderr.read_until(b'\n', &mut stderr_line), if stderr_open => {
                let step = consume_read(read, &mut stderr_line, "stderr", aggregator);
                stderr_open = step == ReadStep::Continue;
                step
            }
        };
        if step == ReadStep::Failed {
            return StreamsEnd::Failed;
        }
    }
    StreamsEnd::Eof
}

/// Handles the result of one `read_until` on `stream`.
///
/// A completed line is decoded lossily, recorded and cleared from `line`.
pub(super) fn consume_read(
    read: std::io::Result<usize>,
    line: &mut Vec<u8>,
    stream: &str,
    aggregator: &mut RoundAggregator,
) -> ReadStep {
    match read {
        Ok(read_bytes) => {
            if !line.is_empty() {
                record_line(line, stream, aggregator);
                line.clear();
            }
            if read_bytes == 0 {
                ReadStep::Eof
            } else {
                ReadStep::Continue
            }
        }
        Err(err) if err.kind() == ErrorKind::Interrupted => ReadStep::Continue,
        Err(err) => {
            warn!("Failed to read probe {}: {}", stream, err);
            ReadStep::Failed
        }
    }
}

fn record_line(raw: &[u8], stream: &str, aggregator: &mut RoundAggregator) {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end_matches(['\n', '\r']);
    if !aggregator.record(parse_line(text)) {
        debug!("Ignored probe {} line: {}", stream, text);
    }
}

/// SIGTERM, a short grace period, then SIGKILL. Always reaps.
async fn terminate(child: &mut Child) -> Result<ExitStatus, ProbeError> {
    if let Some(pid) = child.id() {
        send_sigterm(pid)?;
        match tokio::time::timeout(TERMINATE_GRACE, child.wait()).await {
            Ok(status) => {
                let status = status.map_err(|err| ProbeError::Wait { source: err })?;
                debug!("Probe pid {} terminated with {}", pid, status);
                return Ok(status);
            }
            Err(_elapsed) => {
                warn!(
                    "Probe pid {} ignored SIGTERM for {:?}, killing it.",
                    pid, TERMINATE_GRACE
                );
                child
                    .kill()
                    .await
                    .map_err(|err| ProbeError::Kill { source: err })?;
            }
        }
    }
    // Already reaped: `wait` returns the recorded status.
    child
        .wait()
        .await
        .map_err(|err| ProbeError::Wait { source: err })
}

#[cfg(unix)]
fn send_sigterm(pid: u32) -> Result<(), ProbeError> {
    let raw_pid = libc::pid_t::try_from(pid).map_err(|_overflow| ProbeError::Signal {
        pid,
        source: std::io::Error::from(ErrorKind::InvalidInput),
    })?;
    // SAFETY: `kill` has no memory-safety preconditions. The pid belongs to
    // a child we have not reaped yet, so it cannot have been recycled.
    let rc = unsafe { libc::kill(raw_pid, libc::SIGTERM) };
    if rc == -1 {
        let err = std::io::Error::last_os_error();
        // ESRCH: exited on its own between `id()` and `kill`; wait() reaps it.
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(ProbeError::Signal { pid, source: err });
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32) -> Result<(), ProbeError> {
    Ok(())
}
