use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PingArgs, PositiveU64, parse_target};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// Values given explicitly on the command line win over the file; the file
/// wins over built-in defaults.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(
    args: &mut PingArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "targets")
        && let Some(targets) = config.targets.as_ref()
    {
        let mut parsed = Vec::with_capacity(targets.len());
        for target in targets {
            parsed.push(
                parse_target(target)
                    .map_err(|err| AppError::config(ConfigError::InvalidTarget { source: err }))?,
            );
        }
        args.targets = parsed;
    }

    if !is_cli(matches, "host")
        && let Some(host) = config.host.clone()
    {
        args.host = host;
    }

    if !is_cli(matches, "port")
        && let Some(port) = config.port
    {
        args.port = port;
    }

    if !is_cli(matches, "prefix")
        && let Some(prefix) = config.prefix.clone()
    {
        args.prefix = prefix;
    }

    if !is_cli(matches, "daemon")
        && let Some(daemon) = config.daemon
    {
        args.daemon = daemon;
    }

    if !is_cli(matches, "fping")
        && let Some(path) = config.fping.clone()
    {
        args.fping = path;
    }

    if !is_cli(matches, "logfile")
        && let Some(path) = config.logfile.clone()
    {
        args.logfile = Some(path);
    }

    if !is_cli(matches, "count")
        && let Some(count) = config.count
    {
        args.count = ensure_positive_u64(count, "count")?;
    }

    if !is_cli(matches, "size")
        && let Some(size) = config.size
    {
        args.size = size;
    }

    if !is_cli(matches, "interval")
        && let Some(interval) = config.interval
    {
        args.interval = ensure_positive_u64(interval, "interval")?;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

/// Checks the merged arguments before anything is started.
///
/// # Errors
///
/// Returns an error when no targets are configured, the prefix or probe path
/// is empty, or daemon mode is requested without a log file.
pub fn validate_args(args: &PingArgs) -> AppResult<()> {
    if args.targets.is_empty() {
        return Err(AppError::validation(ValidationError::MissingTargets));
    }
    if args.prefix.trim().is_empty() {
        return Err(AppError::validation(ValidationError::EmptyPrefix));
    }
    if args.fping.as_os_str().is_empty() {
        return Err(AppError::validation(ValidationError::EmptyProbePath));
    }
    if args.daemon && args.logfile.is_none() {
        return Err(AppError::validation(ValidationError::DaemonRequiresLogfile));
    }
    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}
