use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::error::AppResult;
use crate::metrics::SampleTags;
use crate::netext::{Dial, DialContext, InstrumentedDialer};

use super::output::IterationReport;

const READ_BUFFER_CAPACITY: usize = 16 * 1024;

#[derive(Debug)]
pub(super) struct IterationPlan {
    pub target: String,
    pub protocol: String,
    pub payload: Vec<u8>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub tags: SampleTags,
}

pub(super) async fn run_virtual_user<D: Dial>(
    vu: usize,
    dialer: InstrumentedDialer<D>,
    plan: Arc<IterationPlan>,
    iterations: usize,
    report_tx: mpsc::Sender<IterationReport>,
) {
    for iteration in 0..iterations {
        let start = Utc::now();
        let outcome = run_iteration(&dialer, &plan).await;
        let end = Utc::now();

        if let Err(err) = &outcome {
            tracing::warn!("VU {} iteration {} failed: {}", vu, iteration, err);
        }
        let tags = plan
            .tags
            .with([("vu", vu.to_string()), ("iter", iteration.to_string())]);
        let report = IterationReport {
            trail: dialer.trail(start, end, Arc::new(tags)),
            failed: outcome.is_err(),
        };
        if report_tx.send(report).await.is_err() {
            tracing::debug!("Report channel closed; stopping VU {}", vu);
            break;
        }
    }
}

/// One connection: dial, send the payload, read until EOF or the timeout.
async fn run_iteration<D: Dial>(
    dialer: &InstrumentedDialer<D>,
    plan: &IterationPlan,
) -> AppResult<()> {
    let ctx = DialContext::background().with_timeout(plan.connect_timeout);
    let mut conn = dialer.dial(&ctx, &plan.protocol, &plan.target).await?;

    if !plan.payload.is_empty() {
        timeout(plan.timeout, conn.write_all(&plan.payload))
            .await
            .map_err(|_elapsed| timed_out("write"))??;
    }

    // Servers that keep the connection open end the response by silence.
    if let Ok(result) = timeout(plan.timeout, discard_response(&mut conn)).await {
        result?;
    }
    drop(conn.shutdown().await);
    Ok(())
}

/// Reads until EOF, keeping only the byte count the connection meters.
async fn discard_response<R>(conn: &mut R) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0_u8; READ_BUFFER_CAPACITY];
    while conn.read(&mut buf).await? > 0 {}
    Ok(())
}

fn timed_out(stage: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{} timed out", stage))
}
