//! Running fping and turning its output into round data.
mod command;
mod parser;
mod runner;

#[cfg(test)]
mod tests;

pub use command::{ProbeCommand, ProbeLauncher};
pub use parser::{ProbeLine, parse_line};
pub use runner::{ProbeOutcome, run_probe};
