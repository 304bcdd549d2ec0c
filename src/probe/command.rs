use std::path::PathBuf;

use tokio::process::Command;

use crate::args::PingArgs;

/// Produces the command for one probe round.
///
/// The runner owns stdio and lifecycle setup, so implementations only pick
/// the program and its arguments.
pub trait ProbeLauncher: Send + Sync {
    fn command(&self) -> Command;
}

/// `fping -c <count> -b <size> -i <interval> <targets...>`
#[derive(Debug, Clone)]
pub struct ProbeCommand {
    program: PathBuf,
    count: u64,
    size: u16,
    interval_ms: u64,
    targets: Vec<String>,
}

impl ProbeCommand {
    #[must_use]
    pub const fn new(
        program: PathBuf,
        count: u64,
        size: u16,
        interval_ms: u64,
        targets: Vec<String>,
    ) -> Self {
        Self {
            program,
            count,
            size,
            interval_ms,
            targets,
        }
    }

    #[must_use]
    pub fn from_args(args: &PingArgs) -> Self {
        Self::new(
            args.fping.clone(),
            args.count.get(),
            args.size,
            args.interval.get(),
            args.targets.clone(),
        )
    }

    #[must_use]
    pub fn arguments(&self) -> Vec<String> {
        let mut arguments = Vec::with_capacity(self.targets.len().saturating_add(6));
        arguments.push("-c".to_owned());
        arguments.push(self.count.to_string());
        arguments.push("-b".to_owned());
        arguments.push(self.size.to_string());
        arguments.push("-i".to_owned());
        arguments.push(self.interval_ms.to_string());
        arguments.extend(self.targets.iter().cloned());
        arguments
    }
}

impl ProbeLauncher for ProbeCommand {
    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.arguments());
        command
    }
}
