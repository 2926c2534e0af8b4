//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::ProbeArgs;
pub use types::{HostOverride, PositiveUsize};

pub(crate) use parsers::{host_override, parse_ip_range, parse_tag, parse_target};
