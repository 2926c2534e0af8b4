//! Drives instrumented dialers from concurrent virtual users and reports one
//! [`NetTrail`](crate::netext::NetTrail) per iteration.
mod output;
mod settings;
mod vu;


use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::args::ProbeArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::SampleTags;
use crate::netext::{SystemLookup, TcpDialer};

pub use output::ProbeSummary;
pub use settings::dialer_settings;

use output::collect_reports;
use settings::spawn_cache_purge;
use vu::{IterationPlan, run_virtual_user};

const REPORT_CHANNEL_CAPACITY: usize = 1024;

/// Runs every virtual user to completion and writes each trail's samples to
/// `out` as JSON lines.
///
/// # Errors
///
/// Returns an error when the target is missing, the host overrides are
/// invalid, a task panics, or writing samples fails. Failed iterations are
/// counted in the summary instead.
pub async fn run_probe<W>(args: &ProbeArgs, out: W) -> AppResult<ProbeSummary>
where
    W: Write + Send + 'static,
{
    let target = args
        .target
        .clone()
        .ok_or_else(|| AppError::validation(ValidationError::MissingTarget))?;
    let settings = dialer_settings(args, SystemLookup)?;
    let plan = Arc::new(IterationPlan {
        target,
        protocol: args.protocol.clone(),
        payload: args.data.clone().into_bytes(),
        connect_timeout: args.connect_timeout,
        timeout: args.timeout,
        tags: args.tags.iter().cloned().collect::<SampleTags>(),
    });

    let cache_purge = spawn_cache_purge(Arc::clone(&settings.resolver));
    let (report_tx, report_rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);
    let collector = tokio::spawn(collect_reports(report_rx, out));

    let iterations = args.iterations.get();
    let mut handles = Vec::with_capacity(args.vus.get());
    for vu in 1..=args.vus.get() {
        let dialer = settings.dialer(TcpDialer::new(args.nodelay));
        handles.push(tokio::spawn(run_virtual_user(
            vu,
            dialer,
            Arc::clone(&plan),
            iterations,
            report_tx.clone(),
        )));
    }
    drop(report_tx);

    for handle in handles {
        handle.await?;
    }
    cache_purge.abort();
    let summary = collector.await??;
    tracing::info!(
        "Completed {} iterations ({} failed): {} bytes sent, {} bytes received",
        summary.iterations,
        summary.failed,
        summary.bytes_written,
        summary.bytes_read
    );
    Ok(summary)
}
