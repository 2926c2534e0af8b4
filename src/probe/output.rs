use std::io::Write;

use tokio::sync::mpsc;

use crate::error::AppResult;
use crate::metrics::SampleContainer;
use crate::netext::NetTrail;

#[derive(Debug)]
pub(super) struct IterationReport {
    pub trail: NetTrail,
    pub failed: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    pub iterations: u64,
    pub failed: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl ProbeSummary {
    const fn record(&mut self, report: &IterationReport) {
        self.iterations = self.iterations.saturating_add(1);
        if report.failed {
            self.failed = self.failed.saturating_add(1);
        }
        self.bytes_read = self.bytes_read.saturating_add(report.trail.bytes_read());
        self.bytes_written = self
            .bytes_written
            .saturating_add(report.trail.bytes_written());
    }
}

pub(super) async fn collect_reports<W: Write>(
    mut report_rx: mpsc::Receiver<IterationReport>,
    mut out: W,
) -> AppResult<ProbeSummary> {
    let mut summary = ProbeSummary::default();
    while let Some(report) = report_rx.recv().await {
        summary.record(&report);
        for sample in report.trail.samples() {
            serde_json::to_writer(&mut out, sample)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(summary)
}
