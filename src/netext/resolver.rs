use std::io;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::context::far_future;

/// How long a resolved address is served from cache.
pub const DEFAULT_DNS_TTL: Duration = Duration::from_secs(300);

/// Upstream hostname resolution used on a cache miss.
#[async_trait]
pub trait Lookup: Send + Sync {
    /// Resolves `host` to a single address.
    ///
    /// # Errors
    ///
    /// Returns an error when the name cannot be resolved.
    async fn lookup_ip(&self, host: &str) -> io::Result<IpAddr>;
}

/// Resolves through the operating system resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLookup;

#[async_trait]
impl Lookup for SystemLookup {
    async fn lookup_ip(&self, host: &str) -> io::Result<IpAddr> {
        let mut addrs = tokio::net::lookup_host((host, 0)).await?;
        addrs.next().map(|addr| addr.ip()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses resolved for {}", host),
            )
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct CachedAddr {
    ip: IpAddr,
    expires_at: Instant,
}

/// Hostname to IP cache in front of an upstream [`Lookup`].
///
/// Concurrent misses for the same name may each hit the upstream; the last
/// answer wins the cache slot.
pub struct AddressResolver {
    upstream: Box<dyn Lookup>,
    ttl: Duration,
    cache: DashMap<String, CachedAddr>,
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressResolver")
            .field("ttl", &self.ttl)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(SystemLookup, DEFAULT_DNS_TTL)
    }
}

impl AddressResolver {
    #[must_use]
    pub fn new<L>(upstream: L, ttl: Duration) -> Self
    where
        L: Lookup + 'static,
    {
        Self {
            upstream: Box::new(upstream),
            ttl,
            cache: DashMap::new(),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolves a bare hostname, serving unexpired answers from cache.
    ///
    /// IP literals are returned as-is without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns the upstream error on a miss that fails to resolve; nothing is
    /// cached in that case.
    pub async fn lookup(&self, host: &str) -> io::Result<IpAddr> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        if let Some(ip) = self.cached(host) {
            return Ok(ip);
        }

        tracing::debug!("DNS cache miss for {}", host);
        let ip = self.upstream.lookup_ip(host).await?;
        let expires_at = Instant::now()
            .checked_add(self.ttl)
            .unwrap_or_else(far_future);
        self.cache
            .insert(host.to_owned(), CachedAddr { ip, expires_at });
        Ok(ip)
    }

    fn cached(&self, host: &str) -> Option<IpAddr> {
        let now = Instant::now();
        self.cache
            .get(host)
            .and_then(|entry| (entry.expires_at > now).then_some(entry.ip))
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.cache.retain(|_, entry| entry.expires_at > now);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
