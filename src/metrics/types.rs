use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Counter,
    Gauge,
    Trend,
    Rate,
}

/// Unit hint carried by a metric so outputs can format values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Default,
    Time,
    Data,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metric {
    pub name: &'static str,
    pub kind: MetricType,
    pub contains: ValueType,
}

impl Metric {
    #[must_use]
    pub const fn new(name: &'static str, kind: MetricType, contains: ValueType) -> Self {
        Self {
            name,
            kind,
            contains,
        }
    }
}

impl Serialize for Metric {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name)
    }
}

pub const DATA_SENT: Metric = Metric::new("data_sent", MetricType::Counter, ValueType::Data);
pub const DATA_RECEIVED: Metric =
    Metric::new("data_received", MetricType::Counter, ValueType::Data);
pub const ITERATION_DURATION: Metric =
    Metric::new("iteration_duration", MetricType::Trend, ValueType::Time);

/// Sorted, immutable key/value set attached to samples.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SampleTags(BTreeMap<String, String>);

impl SampleTags {
    #[must_use]
    pub const fn new(tags: BTreeMap<String, String>) -> Self {
        Self(tags)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy of these tags extended with `extra`; keys in `extra` win.
    #[must_use]
    pub fn with<I, K, V>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut tags = self.0.clone();
        tags.extend(
            extra
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        Self(tags)
    }
}

impl<K, V> FromIterator<(K, V)> for SampleTags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Sample {
    pub metric: Metric,
    #[serde(rename = "type")]
    pub kind: MetricType,
    pub time: DateTime<Utc>,
    pub value: f64,
    pub tags: Arc<SampleTags>,
}

impl Sample {
    #[must_use]
    pub const fn new(
        metric: Metric,
        time: DateTime<Utc>,
        value: f64,
        tags: Arc<SampleTags>,
    ) -> Self {
        Self {
            metric,
            kind: metric.kind,
            time,
            value,
            tags,
        }
    }
}

/// Anything that yields a batch of samples.
pub trait SampleContainer {
    fn samples(&self) -> &[Sample];
}

/// A sample batch that shares one tag set and one timestamp, which lets
/// outputs order batches by time without scanning every sample.
pub trait ConnectedSampleContainer: SampleContainer {
    fn tags(&self) -> &SampleTags;
    fn time(&self) -> DateTime<Utc>;
}

impl SampleContainer for Sample {
    fn samples(&self) -> &[Sample] {
        std::slice::from_ref(self)
    }
}

/// Converts a duration to the fractional milliseconds used by time metrics.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "Time metrics are reported as fractional milliseconds"
)]
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
