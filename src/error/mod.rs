mod app;
mod config;
mod probe;
mod sink;
mod system;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use probe::ProbeError;
pub use sink::SinkError;
pub use system::SystemError;
pub use validation::ValidationError;
