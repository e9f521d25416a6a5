use std::env::var;
use std::str::FromStr;

use anyhow::Context;
use anyhow::Result;

/// Get the value of ENV var, if any
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var(var_name: &str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var_or_else(var_name: &str, or_else: fn() -> String) -> String {
    env_var(var_name).unwrap_or_else(or_else)
}

/// Get the parsed value of ENV var, or a default when it is not set (or empty)
///
/// # Errors
///
/// Will return `Err` when the value is set but can not be parsed
pub fn env_var_parse_or<T>(var_name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_var(var_name) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("Invalid `{var_name}`: {value}")),
        None => Ok(default),
    }
}
