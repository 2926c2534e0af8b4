use std::net::IpAddr;

use thiserror::Error;

use crate::netext::IpRange;

/// Reason a [`DialContext`](crate::netext::DialContext) stopped the work it
/// was guarding.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Error)]
pub enum DialError {
    #[error("Address '{addr}' is missing a port.")]
    MissingPort { addr: String },
    #[error("Failed to resolve {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IP ({ip}) is in a blacklisted range ({range})")]
    Blacklisted { ip: IpAddr, range: IpRange },
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Transport(std::io::Error),
}

impl DialError {
    /// True when the dial was stopped by the caller's context rather than by
    /// resolution, policy, or the transport.
    #[must_use]
    pub const fn is_context(&self) -> bool {
        matches!(self, Self::Context(_))
    }
}
