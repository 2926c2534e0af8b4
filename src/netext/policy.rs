use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::ValidationError;

/// A CIDR block such as `10.0.0.0/8` or `2001:db8::/32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IpRange {
    network: IpAddr,
    prefix_len: u8,
}

impl IpRange {
    /// Builds a range, clearing any host bits in `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error when `prefix_len` exceeds the address width.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self, ValidationError> {
        let max = max_prefix(addr);
        if prefix_len > max {
            return Err(ValidationError::PrefixTooLong {
                value: addr.to_string(),
                prefix: prefix_len,
                max,
            });
        }
        let network = match addr {
            IpAddr::V4(v4) => IpAddr::V4(Ipv4Addr::from(u32::from(v4) & v4_mask(prefix_len))),
            IpAddr::V6(v6) => IpAddr::V6(Ipv6Addr::from(u128::from(v6) & v6_mask(prefix_len))),
        };
        Ok(Self {
            network,
            prefix_len,
        })
    }

    #[must_use]
    pub const fn network(&self) -> IpAddr {
        self.network
    }

    #[must_use]
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// IPv4 ranges also match IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`).
    #[must_use]
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(network), IpAddr::V4(candidate)) => {
                let mask = v4_mask(self.prefix_len);
                u32::from(candidate) & mask == u32::from(network)
            }
            (IpAddr::V4(network), IpAddr::V6(candidate)) => {
                candidate.to_ipv4_mapped().is_some_and(|mapped| {
                    u32::from(mapped) & v4_mask(self.prefix_len) == u32::from(network)
                })
            }
            (IpAddr::V6(network), IpAddr::V6(candidate)) => {
                let mask = v6_mask(self.prefix_len);
                u128::from(candidate) & mask == u128::from(network)
            }
            (IpAddr::V6(_), IpAddr::V4(_)) => false,
        }
    }
}

const fn max_prefix(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    u32::MAX
        .checked_shl(32_u32.saturating_sub(u32::from(prefix_len)))
        .unwrap_or(0)
}

fn v6_mask(prefix_len: u8) -> u128 {
    u128::MAX
        .checked_shl(128_u32.saturating_sub(u32::from(prefix_len)))
        .unwrap_or(0)
}

impl FromStr for IpRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let invalid = || ValidationError::InvalidIpRange {
            value: value.to_owned(),
        };
        match value.split_once('/') {
            Some((addr, prefix)) => {
                let addr: IpAddr = addr.trim().parse().map_err(|_err| invalid())?;
                let prefix: u8 = prefix.trim().parse().map_err(|_err| invalid())?;
                Self::new(addr, prefix).map_err(|_err| ValidationError::PrefixTooLong {
                    value: value.to_owned(),
                    prefix,
                    max: max_prefix(addr),
                })
            }
            None => {
                let addr: IpAddr = value.parse().map_err(|_err| invalid())?;
                Self::new(addr, max_prefix(addr))
            }
        }
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

/// Ordered list of ranges that must never be dialed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    ranges: Vec<IpRange>,
}

impl AccessPolicy {
    #[must_use]
    pub const fn new(ranges: Vec<IpRange>) -> Self {
        Self { ranges }
    }

    /// First configured range containing `ip`, if any.
    #[must_use]
    pub fn blocking_range(&self, ip: IpAddr) -> Option<&IpRange> {
        self.ranges.iter().find(|range| range.contains(ip))
    }

    #[must_use]
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        self.blocking_range(ip).is_some()
    }

    #[must_use]
    pub fn ranges(&self) -> &[IpRange] {
        &self.ranges
    }
}

impl FromIterator<IpRange> for AccessPolicy {
    fn from_iter<I: IntoIterator<Item = IpRange>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};

    fn ip(value: &str) -> AppResult<IpAddr> {
        value
            .parse()
            .map_err(|err| AppError::validation(format!("Bad test IP {}: {}", value, err)))
    }

    #[test]
    fn parses_cidr_and_masks_host_bits() -> AppResult<()> {
        let range: IpRange = "10.1.2.3/8".parse()?;
        if range.to_string() != "10.0.0.0/8" {
            return Err(AppError::validation(format!("Unexpected range {}", range)));
        }
        let host: IpRange = "192.168.1.7".parse()?;
        if host.prefix_len() != 32 || !host.contains(ip("192.168.1.7")?) {
            return Err(AppError::validation("Bare address must be a host route"));
        }
        let v6: IpRange = "2001:db8::1/32".parse()?;
        if v6.to_string() != "2001:db8::/32" {
            return Err(AppError::validation(format!("Unexpected range {}", v6)));
        }
        Ok(())
    }

    #[test]
    fn rejects_malformed_ranges() -> AppResult<()> {
        for value in ["10.0.0.0/33", "::/129", "not-an-ip/8", "10.0.0.0/x", ""] {
            if value.parse::<IpRange>().is_ok() {
                return Err(AppError::validation(format!("Expected error for '{}'", value)));
            }
        }
        Ok(())
    }

    #[test]
    fn contains_respects_families() -> AppResult<()> {
        let v4: IpRange = "10.0.0.0/8".parse()?;
        if !v4.contains(ip("10.255.0.1")?) || v4.contains(ip("11.0.0.1")?) {
            return Err(AppError::validation("IPv4 membership mismatch"));
        }
        if !v4.contains(ip("::ffff:10.0.0.5")?) {
            return Err(AppError::validation("IPv4-mapped address should match"));
        }
        let v6: IpRange = "fd00::/8".parse()?;
        if !v6.contains(ip("fd12::1")?) || v6.contains(ip("10.0.0.5")?) {
            return Err(AppError::validation("IPv6 membership mismatch"));
        }
        let everything: IpRange = "0.0.0.0/0".parse()?;
        if !everything.contains(ip("203.0.113.9")?) {
            return Err(AppError::validation("/0 must contain every IPv4 address"));
        }
        Ok(())
    }

    #[test]
    fn policy_reports_first_matching_range() -> AppResult<()> {
        let policy: AccessPolicy = ["10.0.0.0/8", "10.0.0.0/24"]
            .iter()
            .map(|value| value.parse::<IpRange>())
            .collect::<Result<_, _>>()?;
        let range = policy
            .blocking_range(ip("10.0.0.5")?)
            .ok_or_else(|| AppError::validation("Expected a blocking range"))?;
        if range.prefix_len() != 8 {
            return Err(AppError::validation("Expected first configured range"));
        }
        if policy.is_blocked(ip("192.0.2.1")?) {
            return Err(AppError::validation("Unexpected block"));
        }
        if AccessPolicy::default().is_blocked(ip("10.0.0.5")?) {
            return Err(AppError::validation("Empty policy must block nothing"));
        }
        Ok(())
    }
}
