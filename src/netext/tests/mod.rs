use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

use super::{
    AccessPolicy, AddressResolver, Dial, DialerSettings, HostOverrides, InstrumentedDialer,
    IpRange, Lookup,
};
use crate::error::{AppError, AppResult};


const DUPLEX_CAPACITY: usize = 64 * 1024;

#[derive(Clone, Default)]
struct StaticLookup {
    answers: Arc<HashMap<String, IpAddr>>,
    calls: Arc<AtomicUsize>,
    hang: bool,
}

impl StaticLookup {
    fn new(answers: &[(&str, IpAddr)]) -> Self {
        Self {
            answers: Arc::new(
                answers
                    .iter()
                    .map(|(host, ip)| ((*host).to_owned(), *ip))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Lookup for StaticLookup {
    async fn lookup_ip(&self, host: &str) -> io::Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.answers
            .get(host)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such host"))
    }
}

#[derive(Clone, Copy, Debug)]
enum Behavior {
    /// Peer sends `reply` bytes, then swallows whatever the client writes.
    Serve { reply: usize },
    Refuse,
    Hang,
}

#[derive(Clone)]
struct FakeDialer {
    behavior: Behavior,
    dialed: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeDialer {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            dialed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn dialed(&self) -> AppResult<Vec<(String, String)>> {
        self.dialed
            .lock()
            .map(|dialed| dialed.clone())
            .map_err(|err| AppError::validation(format!("Dial log poisoned: {}", err)))
    }
}

#[async_trait]
impl Dial for FakeDialer {
    type Conn = DuplexStream;

    async fn dial(&self, protocol: &str, addr: &str) -> io::Result<DuplexStream> {
        if let Ok(mut dialed) = self.dialed.lock() {
            dialed.push((protocol.to_owned(), addr.to_owned()));
        }
        match self.behavior {
            Behavior::Serve { reply } => {
                let (client, mut server) = duplex(DUPLEX_CAPACITY);
                tokio::spawn(async move {
                    let payload = vec![b'x'; reply];
                    if server.write_all(&payload).await.is_err() {
                        return;
                    }
                    let mut sink = Vec::new();
                    drop(server.read_to_end(&mut sink).await);
                });
                Ok(client)
            }
            Behavior::Refuse => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(io::Error::new(io::ErrorKind::TimedOut, "never reached"))
            }
        }
    }
}

fn ip(value: &str) -> AppResult<IpAddr> {
    value
        .parse()
        .map_err(|err| AppError::validation(format!("Bad test IP {}: {}", value, err)))
}

fn policy(ranges: &[&str]) -> AppResult<Arc<AccessPolicy>> {
    let ranges = ranges
        .iter()
        .map(|value| value.parse::<IpRange>())
        .collect::<Result<AccessPolicy, _>>()?;
    Ok(Arc::new(ranges))
}

fn hosts(entries: &[(&str, &str)]) -> AppResult<Arc<HostOverrides>> {
    let mut hosts = HostOverrides::default();
    for (host, addr) in entries {
        hosts.insert(host, ip(addr)?)?;
    }
    Ok(Arc::new(hosts))
}

fn dialer(
    lookup: &StaticLookup,
    base: &FakeDialer,
    blacklist: &[&str],
    overrides: &[(&str, &str)],
) -> AppResult<InstrumentedDialer<FakeDialer>> {
    let settings = DialerSettings {
        resolver: Arc::new(AddressResolver::new(lookup.clone(), Duration::from_secs(60))),
        policy: policy(blacklist)?,
        hosts: hosts(overrides)?,
    };
    Ok(settings.dialer(base.clone()))
}
