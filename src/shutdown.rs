//! Cooperative stop signal and the lifecycle context shared with the
//! signal task.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::SystemError;
use crate::system::logger::LogLevelHandle;

pub type ShutdownSender = watch::Sender<bool>;
pub type ShutdownReceiver = watch::Receiver<bool>;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}

/// Resolves once shutdown has been requested, including before the call.
///
/// Never resolves if every sender is gone without requesting shutdown.
pub async fn wait_for_shutdown(shutdown_rx: &mut ShutdownReceiver) {
    let requested = shutdown_rx.wait_for(|stopped| *stopped).await.is_ok();
    if !requested {
        std::future::pending::<()>().await;
    }
}

#[must_use]
pub fn is_shutdown(shutdown_rx: &ShutdownReceiver) -> bool {
    *shutdown_rx.borrow()
}

/// Process-wide state mutated by signals: the stop flag and the log level.
#[derive(Clone)]
pub struct Lifecycle {
    shutdown_tx: Arc<ShutdownSender>,
    log_level: LogLevelHandle,
}

impl Lifecycle {
    #[must_use]
    pub fn new(log_level: LogLevelHandle) -> Self {
        let (shutdown_tx, _) = shutdown_channel();
        Self {
            shutdown_tx: Arc::new(shutdown_tx),
            log_level,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> ShutdownReceiver {
        self.shutdown_tx.subscribe()
    }

    /// Latches the stop flag. Idempotent.
    pub fn request_shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Raises logging to debug. Leaves the stop flag alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the active log filter cannot be replaced.
    pub fn enable_debug_logging(&self) -> Result<(), SystemError> {
        self.log_level.set_debug()
    }

    #[must_use]
    pub fn log_level(&self) -> &LogLevelHandle {
        &self.log_level
    }
}
