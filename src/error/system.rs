use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Failed to open log file '{path}': {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to reload log filter: {source}")]
    ReloadLogFilter {
        #[source]
        source: tracing_subscriber::reload::Error,
    },
    #[error("Daemonize step '{step}' failed: {source}")]
    Daemonize {
        step: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to register {signal} handler: {source}")]
    RegisterSignal {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
