use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub target: Option<String>,
    pub protocol: Option<String>,
    #[serde(alias = "users")]
    pub vus: Option<usize>,
    pub iterations: Option<usize>,
    pub data: Option<String>,
    pub hosts: Option<BTreeMap<String, String>>,
    #[serde(alias = "blocklist")]
    pub blacklist: Option<Vec<String>>,
    pub dns_ttl: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub tags: Option<BTreeMap<String, String>>,
    pub nodelay: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
