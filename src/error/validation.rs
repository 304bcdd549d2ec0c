use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Missing targets (pass them as arguments or set 'targets' in config).")]
    MissingTargets,
    #[error("Invalid target '{value}'. Targets must be non-empty and contain no whitespace.")]
    InvalidTarget { value: String },
    #[error("Metric prefix must not be empty.")]
    EmptyPrefix,
    #[error("Daemon mode requires a log file (set --logfile or 'logfile' in config).")]
    DaemonRequiresLogfile,
    #[error("Probe executable path must not be empty.")]
    EmptyProbePath,
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
