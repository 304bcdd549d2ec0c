use clap::Parser;
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_FPING, DEFAULT_HOST, DEFAULT_PACKET_SIZE, DEFAULT_PORT, DEFAULT_PREFIX,
};
use super::parsers::{parse_bool_env, parse_positive_u64, parse_target};
use super::types::PositiveU64;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Samples latency and packet loss with fping once a minute and publishes the results to Graphite."
)]
pub struct PingArgs {
    /// Hosts or IP addresses to probe
    #[arg(value_name = "TARGET", value_parser = parse_target)]
    pub targets: Vec<String>,

    /// Graphite host receiving plaintext metrics
    #[arg(long, short = 'H', default_value = DEFAULT_HOST)]
    pub host: String,

    /// Graphite plaintext port
    #[arg(long, short = 'p', default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Metric path prefix; each target becomes <prefix>.<target>.<metric>
    #[arg(long, short = 'P', default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Detach from the terminal and run in the background (requires --logfile)
    #[arg(long, short = 'd')]
    pub daemon: bool,

    /// Path to the fping executable
    #[arg(long = "fping", short = 'F', default_value = DEFAULT_FPING)]
    pub fping: PathBuf,

    /// Append logs to this file instead of stderr
    #[arg(long = "logfile", short = 'l')]
    pub logfile: Option<PathBuf>,

    /// Packets sent to every target per round
    #[arg(long, short = 'c', default_value = "20", value_parser = parse_positive_u64)]
    pub count: PositiveU64,

    /// ICMP payload size in bytes
    #[arg(long, short = 's', default_value_t = DEFAULT_PACKET_SIZE)]
    pub size: u16,

    /// Minimum delay between packets in milliseconds
    #[arg(long, short = 'i', default_value = "10", value_parser = parse_positive_u64)]
    pub interval: PositiveU64,

    /// Path to config file (TOML/JSON). Defaults to ./pingstat.toml if present.
    #[arg(long, short = 'f')]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by PINGSTAT_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
