use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{info, warn};

use crate::app::Scheduler;
use crate::args::{DEFAULT_CONFIG_FILE, PingArgs};
use crate::error::AppResult;
use crate::probe::ProbeCommand;
use crate::shutdown::Lifecycle;
use crate::sinks::{GraphiteConfig, GraphitePublisher};
use crate::system::{LogLevelHandle, LogTarget, init_logging, open_log_file, setup_signal_handlers};

/// Parses arguments, prepares the process and runs the scheduler until a
/// shutdown signal arrives.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, an unopenable
/// log file, failed daemonization, or signal registration failure.
pub fn run() -> AppResult<()> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(());
    };
    apply_file_config(&mut args, &matches)?;
    crate::config::validate_args(&args)?;

    let log_target = match args.logfile.as_deref() {
        Some(path) => LogTarget::File(open_log_file(path)?),
        None => LogTarget::Stderr,
    };
    detach(&args)?;
    let log_level = init_logging(args.verbose, args.no_color, log_target);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, log_level))
}

fn parse_args() -> AppResult<Option<(PingArgs, ArgMatches)>> {
    let mut cmd = PingArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = PingArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    treat_as_empty && !Path::new(DEFAULT_CONFIG_FILE).exists()
}

fn apply_file_config(args: &mut PingArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}

#[cfg(unix)]
fn detach(args: &PingArgs) -> AppResult<()> {
    if args.daemon {
        crate::system::daemonize()?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn detach(args: &PingArgs) -> AppResult<()> {
    if args.daemon {
        eprintln!("Daemon mode is not supported on this platform; running in foreground.");
    }
    Ok(())
}

async fn run_async(args: PingArgs, log_level: LogLevelHandle) -> AppResult<()> {
    let lifecycle = Lifecycle::new(log_level);
    let signal_handle = setup_signal_handlers(&lifecycle)?;

    let graphite = GraphiteConfig::from_args(&args);
    info!(
        "Probing {} targets with {} every minute, publishing to {} under '{}'.",
        args.targets.len(),
        args.fping.display(),
        graphite.address(),
        graphite.prefix
    );

    let launcher = ProbeCommand::from_args(&args);
    let publisher = GraphitePublisher::new(graphite);
    let mut scheduler = Scheduler::new(launcher, publisher, args.targets, lifecycle.subscribe());
    scheduler.run().await;

    lifecycle.request_shutdown();
    if let Err(err) = signal_handle.await {
        warn!("Signal task failed: {}", err);
    }
    info!("Exiting.");
    Ok(())
}
