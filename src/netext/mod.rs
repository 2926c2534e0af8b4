//! Instrumented dialing: cached resolution, host overrides, address
//! blacklists, and per-iteration byte accounting.
mod conn;
mod context;
mod dialer;
mod policy;
mod resolver;
mod trail;

#[cfg(test)]
mod tests;

pub use conn::{ByteCounters, ByteCounts, InstrumentedConnection};
pub use context::{CancelHandle, DialContext};
pub use dialer::{Dial, DialerSettings, HostOverrides, InstrumentedDialer, TcpDialer};
pub use policy::{AccessPolicy, IpRange};
pub use resolver::{AddressResolver, DEFAULT_DNS_TTL, Lookup, SystemLookup};
pub use trail::NetTrail;
