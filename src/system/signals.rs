use crate::error::SystemError;
use crate::shutdown::{Lifecycle, wait_for_shutdown};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

#[cfg(unix)]
fn register(kind: SignalKind, name: &'static str) -> Result<tokio::signal::unix::Signal, SystemError> {
    signal(kind).map_err(|source| SystemError::RegisterSignal {
        signal: name,
        source,
    })
}

/// Spawns the task translating OS signals into lifecycle state.
///
/// `SIGINT`/`SIGTERM` request shutdown, `SIGUSR1` raises logging to debug.
/// The task exits once shutdown has been requested by any path.
///
/// # Errors
///
/// Returns an error if a signal handler cannot be registered.
#[cfg(unix)]
pub fn setup_signal_handlers(
    lifecycle: &Lifecycle,
) -> Result<tokio::task::JoinHandle<()>, SystemError> {
    let mut interrupt = register(SignalKind::interrupt(), "SIGINT")?;
    let mut terminate = register(SignalKind::terminate(), "SIGTERM")?;
    let mut user1 = register(SignalKind::user_defined1(), "SIGUSR1")?;
    let lifecycle = lifecycle.clone();

    Ok(tokio::spawn(async move {
        let mut shutdown_rx = lifecycle.subscribe();
        loop {
            tokio::select! {
                () = wait_for_shutdown(&mut shutdown_rx) => break,
                _ = interrupt.recv() => {
                    tracing::info!("Received SIGINT, shutting down");
                    lifecycle.request_shutdown();
                }
                _ = terminate.recv() => {
                    tracing::info!("Received SIGTERM, shutting down");
                    lifecycle.request_shutdown();
                }
                _ = user1.recv() => {
                    match lifecycle.enable_debug_logging() {
                        Ok(()) => tracing::info!("Received SIGUSR1, debug logging enabled"),
                        Err(err) => tracing::warn!("Failed to enable debug logging: {}", err),
                    }
                }
            }
        }
    }))
}

/// # Errors
///
/// Never fails on this platform.
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    lifecycle: &Lifecycle,
) -> Result<tokio::task::JoinHandle<()>, SystemError> {
    let lifecycle = lifecycle.clone();
    Ok(tokio::spawn(async move {
        let mut shutdown_rx = lifecycle.subscribe();
        tokio::select! {
            () = wait_for_shutdown(&mut shutdown_rx) => {}
            _ = tokio::signal::ctrl_c() => {
                lifecycle.request_shutdown();
            }
        }
    }))
}
