use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error::{DialError, ValidationError};
use crate::metrics::SampleTags;

use super::conn::{ByteCounters, ByteCounts, InstrumentedConnection};
use super::context::DialContext;
use super::policy::AccessPolicy;
use super::resolver::AddressResolver;
use super::trail::NetTrail;

/// Connection establishment the instrumented dialer delegates to once an
/// address has been resolved and cleared by policy.
#[async_trait]
pub trait Dial: Send + Sync {
    type Conn: AsyncRead + AsyncWrite + Send + Unpin;

    /// Connects to `addr`, an `ip:port` (IPv6 bracketed) string.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the connection cannot be established.
    async fn dial(&self, protocol: &str, addr: &str) -> io::Result<Self::Conn>;
}

/// Plain TCP connector.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpDialer {
    nodelay: bool,
}

impl TcpDialer {
    #[must_use]
    pub const fn new(nodelay: bool) -> Self {
        Self { nodelay }
    }
}

#[async_trait]
impl Dial for TcpDialer {
    type Conn = TcpStream;

    async fn dial(&self, protocol: &str, addr: &str) -> io::Result<TcpStream> {
        match protocol {
            "tcp" | "tcp4" | "tcp6" => {
                let stream = TcpStream::connect(addr).await?;
                if self.nodelay {
                    stream.set_nodelay(true)?;
                }
                Ok(stream)
            }
            other => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported protocol '{}'", other),
            )),
        }
    }
}

/// Static hostname to IP mapping consulted before DNS.
///
/// Keys are bare hostnames; a key carrying a port never matches a dial.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostOverrides(HashMap<String, IpAddr>);

impl HostOverrides {
    /// Adds a mapping.
    ///
    /// # Errors
    ///
    /// Returns an error when `host` includes a port.
    pub fn insert(&mut self, host: &str, ip: IpAddr) -> Result<(), ValidationError> {
        if host.parse::<IpAddr>().is_err() && host.contains(':') {
            return Err(ValidationError::HostOverrideHasPort {
                host: host.to_owned(),
            });
        }
        self.0.insert(host.to_owned(), ip);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, host: &str) -> Option<IpAddr> {
        self.0.get(host).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Construction-time pieces shared by every dialer of a run.
#[derive(Clone, Debug, Default)]
pub struct DialerSettings {
    pub resolver: Arc<AddressResolver>,
    pub policy: Arc<AccessPolicy>,
    pub hosts: Arc<HostOverrides>,
}

impl DialerSettings {
    /// Creates a dialer with its own, zeroed byte counters.
    #[must_use]
    pub fn dialer<D: Dial>(&self, base: D) -> InstrumentedDialer<D> {
        InstrumentedDialer {
            base,
            resolver: Arc::clone(&self.resolver),
            policy: Arc::clone(&self.policy),
            hosts: Arc::clone(&self.hosts),
            counters: Arc::new(ByteCounters::default()),
        }
    }
}

/// Dials through host overrides, the DNS cache, and the access policy, and
/// meters every byte of the connections it hands out.
///
/// Safe to share between tasks; each dial only reads shared state, and byte
/// accounting happens later on the returned connections.
#[derive(Debug)]
pub struct InstrumentedDialer<D = TcpDialer> {
    base: D,
    resolver: Arc<AddressResolver>,
    policy: Arc<AccessPolicy>,
    hosts: Arc<HostOverrides>,
    counters: Arc<ByteCounters>,
}

impl<D: Dial> InstrumentedDialer<D> {
    /// Opens a connection to `host_port` (`host:port`, `[v6]:port`).
    ///
    /// Overrides win over DNS, and the policy is checked against whichever
    /// address was chosen. The caller's port is always kept.
    ///
    /// # Errors
    ///
    /// Returns [`DialError::MissingPort`] for an address without a port,
    /// [`DialError::Resolution`] when the host cannot be resolved,
    /// [`DialError::Blacklisted`] when the address is forbidden,
    /// [`DialError::Context`] when `ctx` is canceled or times out, and
    /// [`DialError::Transport`] with the base dialer's error otherwise.
    pub async fn dial(
        &self,
        ctx: &DialContext,
        protocol: &str,
        host_port: &str,
    ) -> Result<InstrumentedConnection<D::Conn>, DialError> {
        let (host, port) = split_host_port(host_port)?;
        let ip = self.resolve(ctx, host).await?;

        if let Some(range) = self.policy.blocking_range(ip) {
            tracing::debug!("Refusing to dial {} ({}): blacklisted by {}", host, ip, range);
            return Err(DialError::Blacklisted { ip, range: *range });
        }

        let addr = join_ip_port(ip, port);
        let conn = ctx
            .run(self.base.dial(protocol, &addr))
            .await?
            .map_err(DialError::Transport)?;
        Ok(InstrumentedConnection::new(conn, Arc::clone(&self.counters)))
    }

    async fn resolve(&self, ctx: &DialContext, host: &str) -> Result<IpAddr, DialError> {
        if let Some(ip) = self.hosts.get(host) {
            tracing::debug!("Host override {} -> {}", host, ip);
            return Ok(ip);
        }
        ctx.run(self.resolver.lookup(host))
            .await?
            .map_err(|source| DialError::Resolution {
                host: host.to_owned(),
                source,
            })
    }
}

impl<D> InstrumentedDialer<D> {
    /// Drains the byte counters into a trail for the iteration that ran from
    /// `start_time` to `end_time`.
    #[must_use]
    pub fn trail(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        tags: Arc<SampleTags>,
    ) -> NetTrail {
        NetTrail::drain(&self.counters, start_time, end_time, tags)
    }

    /// Totals accumulated since the last drain, left in place.
    #[must_use]
    pub fn counters(&self) -> ByteCounts {
        self.counters.load()
    }
}

fn split_host_port(host_port: &str) -> Result<(&str, &str), DialError> {
    let (host, port) = host_port
        .rsplit_once(':')
        .ok_or_else(|| DialError::MissingPort {
            addr: host_port.to_owned(),
        })?;
    let host = host
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(host);
    Ok((host, port))
}

fn join_ip_port(ip: IpAddr, port: &str) -> String {
    match ip {
        IpAddr::V4(v4) => format!("{}:{}", v4, port),
        IpAddr::V6(v6) => format!("[{}]:{}", v6, port),
    }
}
