use clap::Parser;

use crate::error::{AppError, AppResult};

use super::PingArgs;

pub(crate) fn parse_test_args<I, T>(args: I) -> AppResult<PingArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    PingArgs::try_parse_from(args).map_err(AppError::from)
}
