use super::types::PositiveU64;
use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

/// Accepts a hostname or address as fping would receive it on argv.
pub(crate) fn parse_target(s: &str) -> Result<String, ValidationError> {
    let value = s.trim();
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidTarget {
            value: s.to_owned(),
        });
    }
    Ok(value.to_owned())
}
