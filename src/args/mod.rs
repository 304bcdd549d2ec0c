//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::PingArgs;
pub use types::PositiveU64;

pub(crate) use defaults::DEFAULT_CONFIG_FILE;
pub(crate) use parsers::parse_target;
