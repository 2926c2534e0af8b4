use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::args::ProbeArgs;
use crate::error::{AppError, AppResult};
use crate::netext::{AccessPolicy, AddressResolver, DialerSettings, HostOverrides, Lookup};

/// Builds the resolver, policy, and host map shared by every virtual user.
///
/// # Errors
///
/// Returns an error when a host override key carries a port.
pub fn dialer_settings<L>(args: &ProbeArgs, lookup: L) -> AppResult<DialerSettings>
where
    L: Lookup + 'static,
{
    let mut hosts = HostOverrides::default();
    for entry in &args.hosts {
        hosts
            .insert(&entry.host, entry.ip)
            .map_err(AppError::validation)?;
    }
    tracing::debug!(
        "Dialer settings: {} host overrides, {} blacklisted ranges, DNS TTL {:?}",
        hosts.len(),
        args.blacklist.len(),
        args.dns_ttl
    );
    Ok(DialerSettings {
        resolver: Arc::new(AddressResolver::new(lookup, args.dns_ttl)),
        policy: Arc::new(AccessPolicy::new(args.blacklist.clone())),
        hosts: Arc::new(hosts),
    })
}

const MIN_CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(1);

/// Drops expired DNS cache entries once per TTL until the task is aborted.
pub(super) fn spawn_cache_purge(resolver: Arc<AddressResolver>) -> JoinHandle<()> {
    let period = resolver.ttl().max(MIN_CACHE_PURGE_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            resolver.purge_expired();
        }
    })
}
