use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::{HostOverride, ProbeArgs, parsers};
use crate::config::apply_config;
use crate::config::parse_duration_value;
use crate::config::types::ConfigFile;
use crate::error::{AppError, AppResult, ConfigError};
use crate::netext::IpRange;

thread_local! {
    static BASE_MATCHES: ArgMatches = ProbeArgs::command().get_matches_from(["dialtrail"]);
}

/// Parses a duration argument (e.g. `10s`, `500ms`).
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_arg_input(input: &str) -> AppResult<Duration> {
    parsers::parse_duration_arg(input)
}

/// Parses a duration value from config.
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_value_input(input: &str) -> AppResult<Duration> {
    parse_duration_value(input).map_err(AppError::from)
}

/// Parses a blacklist entry in CIDR or bare address form.
///
/// # Errors
///
/// Returns an error when the range is invalid.
pub fn parse_ip_range_input(input: &str) -> AppResult<IpRange> {
    parsers::parse_ip_range(input).map_err(AppError::from)
}

/// Parses a `host=ip` override.
///
/// # Errors
///
/// Returns an error when the override is malformed.
pub fn parse_host_override_input(input: &str) -> AppResult<HostOverride> {
    parsers::parse_host_override(input).map_err(AppError::from)
}

/// Parses TOML config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_toml(input: &str) -> AppResult<ProbeArgs> {
    let config: ConfigFile = toml::from_str(input).map_err(|err| {
        AppError::config(ConfigError::ParseToml {
            path: PathBuf::from("fuzz.toml"),
            source: err,
        })
    })?;
    apply_to_defaults(&config)
}

/// Parses JSON config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_json(input: &str) -> AppResult<ProbeArgs> {
    let config: ConfigFile = serde_json::from_str(input)?;
    apply_to_defaults(&config)
}

fn apply_to_defaults(config: &ConfigFile) -> AppResult<ProbeArgs> {
    BASE_MATCHES.with(|matches| {
        let mut args = ProbeArgs::from_arg_matches(matches)?;
        apply_config(&mut args, matches, config)?;
        Ok(args)
    })
}
