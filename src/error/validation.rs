use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid IP range '{value}'. Expected 'address/prefix' or a bare address.")]
    InvalidIpRange { value: String },
    #[error("Invalid prefix length {prefix} for '{value}' (max {max}).")]
    PrefixTooLong { value: String, prefix: u8, max: u8 },
    #[error("Invalid host override '{value}'. Expected 'hostname=ip'.")]
    InvalidHostOverrideFormat { value: String },
    #[error("Invalid IP '{ip}' for host override '{host}'.")]
    InvalidHostOverrideIp { host: String, ip: String },
    #[error("Host override key '{host}' must be a bare hostname without a port.")]
    HostOverrideHasPort { host: String },
    #[error("Invalid tag '{value}'. Expected 'key=value'.")]
    InvalidTagFormat { value: String },
    #[error("Invalid target '{value}'. Expected 'host:port'.")]
    InvalidTarget { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Missing target (set --target or provide it in config).")]
    MissingTarget,
    #[error("All {count} iterations failed.")]
    AllIterationsFailed { count: u64 },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
