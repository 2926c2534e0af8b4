use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::metrics::{
    ConnectedSampleContainer, DATA_RECEIVED, DATA_SENT, ITERATION_DURATION, Sample,
    SampleContainer, SampleTags, duration_ms,
};

use super::conn::ByteCounters;

/// Bytes exchanged by one dialer's connections since the previous drain,
/// attributed to the iteration that ran from `start_time` to `end_time`.
#[derive(Clone, Debug)]
pub struct NetTrail {
    bytes_read: u64,
    bytes_written: u64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    tags: Arc<SampleTags>,
    samples: [Sample; 3],
}

impl NetTrail {
    pub(crate) fn drain(
        counters: &ByteCounters,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        tags: Arc<SampleTags>,
    ) -> Self {
        let totals = counters.drain();
        let duration = end_time
            .signed_duration_since(start_time)
            .to_std()
            .unwrap_or(Duration::ZERO);
        let samples = [
            Sample::new(
                DATA_SENT,
                end_time,
                totals.written as f64,
                Arc::clone(&tags),
            ),
            Sample::new(
                DATA_RECEIVED,
                end_time,
                totals.read as f64,
                Arc::clone(&tags),
            ),
            Sample::new(
                ITERATION_DURATION,
                end_time,
                duration_ms(duration),
                Arc::clone(&tags),
            ),
        ];
        Self {
            bytes_read: totals.read,
            bytes_written: totals.written,
            start_time,
            end_time,
            tags,
            samples,
        }
    }

    #[must_use]
    pub const fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub const fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Iteration length; zero when `end_time` precedes `start_time`.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end_time
            .signed_duration_since(self.start_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl SampleContainer for NetTrail {
    fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl ConnectedSampleContainer for NetTrail {
    fn tags(&self) -> &SampleTags {
        &self.tags
    }

    fn time(&self) -> DateTime<Utc> {
        self.end_time
    }
}
