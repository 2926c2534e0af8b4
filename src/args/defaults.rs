pub(crate) const DEFAULT_PROTOCOL: &str = "tcp";
pub(crate) const DEFAULT_DNS_TTL: &str = "5m";
pub(crate) const DEFAULT_CONNECT_TIMEOUT: &str = "5s";
pub(crate) const DEFAULT_TIMEOUT: &str = "10s";
