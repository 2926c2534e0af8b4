//! Core library for the `dialtrail` CLI.
//!
//! The centerpiece is [`netext::InstrumentedDialer`]: it resolves hosts
//! through static overrides and a TTL cache, refuses blacklisted address
//! ranges, and meters every byte moved over the connections it opens so the
//! traffic can be drained into per-iteration metric samples
//! ([`netext::NetTrail`]). The `probe` module drives it from concurrent
//! virtual users for the command-line application.
pub mod args;
pub mod config;
pub mod error;
pub mod metrics;
pub mod netext;
pub mod probe;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
