//! Metric descriptors, tagged samples, and the sample container traits.
mod types;


pub use types::{
    ConnectedSampleContainer, DATA_RECEIVED, DATA_SENT, ITERATION_DURATION, Metric, MetricType,
    Sample, SampleContainer, SampleTags, ValueType, duration_ms,
};
