use std::net::IpAddr;
use std::time::Duration;

use super::types::{HostOverride, PositiveUsize};
use crate::config::parse_duration_value;
use crate::error::{AppError, AppResult, ValidationError};
use crate::netext::IpRange;

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}

pub(crate) fn parse_ip_range(s: &str) -> Result<IpRange, ValidationError> {
    s.parse()
}

pub(crate) fn parse_host_override(s: &str) -> Result<HostOverride, ValidationError> {
    let (host, ip) = s
        .split_once('=')
        .ok_or_else(|| ValidationError::InvalidHostOverrideFormat {
            value: s.to_owned(),
        })?;
    host_override(host, ip)
}

/// Validates one host map entry; shared by the CLI and config file paths.
pub(crate) fn host_override(host: &str, ip: &str) -> Result<HostOverride, ValidationError> {
    let host = host.trim();
    let ip = ip.trim();
    if host.is_empty() {
        return Err(ValidationError::InvalidHostOverrideFormat {
            value: format!("{}={}", host, ip),
        });
    }
    if host.contains(':') && host.parse::<IpAddr>().is_err() {
        return Err(ValidationError::HostOverrideHasPort {
            host: host.to_owned(),
        });
    }
    let ip = ip
        .parse::<IpAddr>()
        .map_err(|_err| ValidationError::InvalidHostOverrideIp {
            host: host.to_owned(),
            ip: ip.to_owned(),
        })?;
    Ok(HostOverride {
        host: host.to_owned(),
        ip,
    })
}

pub(crate) fn parse_tag(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        Some(_) | None => Err(ValidationError::InvalidTagFormat {
            value: s.to_owned(),
        }),
    }
}

pub(crate) fn parse_target(s: &str) -> Result<String, ValidationError> {
    let value = s.trim();
    let valid = value
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
    if valid {
        Ok(value.to_owned())
    } else {
        Err(ValidationError::InvalidTarget {
            value: s.to_owned(),
        })
    }
}
