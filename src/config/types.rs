use std::path::PathBuf;

use serde::Deserialize;

/// Keys accepted in `pingstat.toml` (or an equivalent JSON file).
///
/// Every key mirrors a CLI flag of the same name. A key only takes effect
/// when the matching flag was not given on the command line.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub prefix: Option<String>,
    pub daemon: Option<bool>,
    #[serde(alias = "fping_path")]
    pub fping: Option<PathBuf>,
    #[serde(alias = "log_file")]
    pub logfile: Option<PathBuf>,
    pub count: Option<u64>,
    pub size: Option<u16>,
    pub interval: Option<u64>,
    pub targets: Option<Vec<String>>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}
