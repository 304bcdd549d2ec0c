use super::{ConfigError, ProbeError, SinkError, SystemError, ValidationError};

impl From<&'static str> for ValidationError {
    fn from(message: &'static str) -> Self {
        ValidationError::TestExpectation { message }
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ProbeError {
    fn from(message: &'static str) -> Self {
        ProbeError::TestExpectation { message }
    }
}

impl From<String> for ProbeError {
    fn from(value: String) -> Self {
        ProbeError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for SinkError {
    fn from(message: &'static str) -> Self {
        SinkError::TestExpectation { message }
    }
}

impl From<String> for SinkError {
    fn from(value: String) -> Self {
        SinkError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for SystemError {
    fn from(message: &'static str) -> Self {
        SystemError::TestExpectation { message }
    }
}

impl From<String> for SystemError {
    fn from(value: String) -> Self {
        SystemError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
