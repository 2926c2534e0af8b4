use clap::Parser;
use std::time::Duration;

use crate::netext::IpRange;

use super::defaults::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_DNS_TTL, DEFAULT_PROTOCOL, DEFAULT_TIMEOUT};
use super::parsers::{
    parse_duration_arg, parse_host_override, parse_ip_range, parse_positive_usize, parse_tag,
    parse_target,
};
use super::types::{HostOverride, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Dial a target from concurrent virtual users through an instrumented dialer and report per-iteration traffic samples as JSON lines."
)]
pub struct ProbeArgs {
    /// Target address to dial (host:port or [v6]:port)
    #[arg(long = "target", short = 't', value_parser = parse_target)]
    pub target: Option<String>,

    /// Transport protocol passed to the dialer (tcp, tcp4, tcp6)
    #[arg(long = "protocol", default_value = DEFAULT_PROTOCOL)]
    pub protocol: String,

    /// Number of concurrent virtual users
    #[arg(long = "vus", default_value = "1", value_parser = parse_positive_usize)]
    pub vus: PositiveUsize,

    /// Iterations per virtual user
    #[arg(long = "iterations", short = 'i', default_value = "1", value_parser = parse_positive_usize)]
    pub iterations: PositiveUsize,

    /// Payload written on every connection
    #[arg(long = "data", short = 'd', default_value = "")]
    pub data: String,

    /// Static host override 'hostname=ip' (repeatable); wins over DNS
    #[arg(long = "host", value_parser = parse_host_override)]
    pub hosts: Vec<HostOverride>,

    /// IP range that must never be dialed, CIDR or bare address (repeatable)
    #[arg(long = "blacklist", value_parser = parse_ip_range)]
    pub blacklist: Vec<IpRange>,

    /// How long resolved addresses stay cached (supports ms/s/m/h)
    #[arg(long = "dns-ttl", default_value = DEFAULT_DNS_TTL, value_parser = parse_duration_arg)]
    pub dns_ttl: Duration,

    /// Timeout for resolution plus connect (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = DEFAULT_CONNECT_TIMEOUT, value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Timeout for writing the payload and reading the response (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = DEFAULT_TIMEOUT, value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Tag added to every sample 'key=value' (repeatable)
    #[arg(long = "tag", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// Disable Nagle's algorithm on dialed TCP connections
    #[arg(long = "nodelay")]
    pub nodelay: bool,

    /// Path to config file (TOML or JSON)
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,
}
