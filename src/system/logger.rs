use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::error::SystemError;

const LOG_ENV: &str = "PINGSTAT_LOG";
const DEBUG_DIRECTIVE: &str = "debug";
const INFO_DIRECTIVE: &str = "info";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Where log records go.
#[derive(Debug)]
pub enum LogTarget {
    Stderr,
    File(File),
}

/// Opens (or creates) the log file in append mode.
///
/// # Errors
///
/// Returns an error if the file cannot be opened for appending.
pub fn open_log_file(path: &Path) -> Result<File, SystemError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SystemError::OpenLogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Runtime handle onto the active log level.
#[derive(Clone, Debug)]
pub struct LogLevelHandle {
    filter: Option<FilterHandle>,
    debug: Arc<AtomicBool>,
}

impl LogLevelHandle {
    /// A handle not bound to any installed subscriber.
    #[must_use]
    pub fn detached(debug: bool) -> Self {
        Self {
            filter: None,
            debug: Arc::new(AtomicBool::new(debug)),
        }
    }

    /// Switches the active filter to `debug`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscriber owning the filter is gone.
    pub fn set_debug(&self) -> Result<(), SystemError> {
        if let Some(filter) = self.filter.as_ref() {
            filter
                .reload(EnvFilter::new(DEBUG_DIRECTIVE))
                .map_err(|source| SystemError::ReloadLogFilter { source })?;
        }
        self.debug.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::SeqCst)
    }
}

fn initial_filter(verbose: bool) -> EnvFilter {
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new(DEBUG_DIRECTIVE)
                } else {
                    EnvFilter::new(INFO_DIRECTIVE)
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(INFO_DIRECTIVE)),
        )
}

/// Installs the global subscriber and returns a handle for raising the level.
///
/// If a global subscriber is already set the returned handle is detached.
pub fn init_logging(verbose: bool, no_color: bool, target: LogTarget) -> LogLevelHandle {
    let (filter_layer, filter_handle) = reload::Layer::new(initial_filter(verbose));
    let (writer, ansi) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), !no_color),
        LogTarget::File(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(writer).with_ansi(ansi));

    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => LogLevelHandle {
            filter: Some(filter_handle),
            debug: Arc::new(AtomicBool::new(verbose)),
        },
        Err(err) => {
            eprintln!("Failed to set global default subscriber: {}", err);
            LogLevelHandle::detached(verbose)
        }
    }
}
