#[cfg(unix)]
pub mod daemon;
pub mod logger;
pub mod signals;

#[cfg(unix)]
pub use daemon::daemonize;
pub use logger::{LogLevelHandle, LogTarget, init_logging, open_log_file};
pub use signals::setup_signal_handlers;
