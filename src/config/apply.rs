use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{
    PositiveUsize, ProbeArgs, host_override, parse_ip_range, parse_tag, parse_target,
};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments. Options given on the
/// command line always win.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut ProbeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "target")
        && let Some(target) = config.target.as_deref()
    {
        args.target = Some(parse_target(target)?);
    }

    if !is_cli(matches, "protocol")
        && let Some(protocol) = config.protocol.clone()
    {
        args.protocol = protocol;
    }

    if !is_cli(matches, "vus")
        && let Some(vus) = config.vus
    {
        args.vus = ensure_positive_usize(vus, "vus")?;
    }

    if !is_cli(matches, "iterations")
        && let Some(iterations) = config.iterations
    {
        args.iterations = ensure_positive_usize(iterations, "iterations")?;
    }

    if !is_cli(matches, "data")
        && let Some(data) = config.data.clone()
    {
        args.data = data;
    }

    if !is_cli(matches, "hosts")
        && let Some(hosts) = config.hosts.as_ref()
    {
        let mut parsed = Vec::with_capacity(hosts.len());
        for (host, ip) in hosts {
            parsed.push(
                host_override(host, ip)
                    .map_err(|err| AppError::config(ConfigError::InvalidHost { source: err }))?,
            );
        }
        args.hosts = parsed;
    }

    if !is_cli(matches, "blacklist")
        && let Some(blacklist) = config.blacklist.as_ref()
    {
        let mut parsed = Vec::with_capacity(blacklist.len());
        for entry in blacklist {
            parsed.push(
                parse_ip_range(entry).map_err(|err| {
                    AppError::config(ConfigError::InvalidBlacklist { source: err })
                })?,
            );
        }
        args.blacklist = parsed;
    }

    if !is_cli(matches, "dns_ttl")
        && let Some(value) = config.dns_ttl.as_ref()
    {
        args.dns_ttl = to_duration(value, "dns_ttl")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(value) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = to_duration(value, "connect_timeout")?;
    }

    if !is_cli(matches, "timeout")
        && let Some(value) = config.timeout.as_ref()
    {
        args.timeout = to_duration(value, "timeout")?;
    }

    if !is_cli(matches, "tags")
        && let Some(tags) = config.tags.as_ref()
    {
        let mut parsed = Vec::with_capacity(tags.len());
        for (key, value) in tags {
            parsed.push(
                parse_tag(&format!("{}={}", key, value))
                    .map_err(|err| AppError::config(ConfigError::InvalidTag { source: err }))?,
            );
        }
        args.tags = parsed;
    }

    if !is_cli(matches, "nodelay")
        && let Some(nodelay) = config.nodelay
    {
        args.nodelay = nodelay;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|_err| AppError::config(ConfigError::FieldMustBePositive { field }))
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}
