use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::ContextError;

/// Cancellation and deadline scope for a single dial.
///
/// Clones share the same cancellation signal. A context without a cancel
/// handle or deadline never stops the work it guards.
#[derive(Clone, Debug, Default)]
pub struct DialContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels every clone of the [`DialContext`] it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl DialContext {
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    /// Sets a deadline; an earlier existing deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(
            self.deadline
                .map_or(deadline, |current| current.min(deadline)),
        );
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(far_future);
        self.with_deadline(deadline)
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why the context is done, or `None` while it is still live.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(ContextError::Canceled);
        }
        if self
            .deadline
            .is_some_and(|deadline| deadline <= Instant::now())
        {
            return Some(ContextError::DeadlineExceeded);
        }
        None
    }

    /// Drives `future` until it completes or the context is done, whichever
    /// happens first. The future is dropped when the context wins.
    ///
    /// # Errors
    ///
    /// Returns the context's own [`ContextError`] when it is canceled or its
    /// deadline passes before `future` completes.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            () = canceled(self.cancel.clone()) => Err(ContextError::Canceled),
            () = expired(self.deadline) => Err(ContextError::DeadlineExceeded),
            output = future => Ok(output),
        }
    }
}

async fn canceled(rx: Option<watch::Receiver<bool>>) {
    match rx {
        Some(mut rx) => {
            if rx.wait_for(|canceled| *canceled).await.is_err() {
                // Handle dropped without canceling.
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

pub(super) fn far_future() -> Instant {
    // Roughly 30 years, the horizon tokio uses for "never".
    Instant::now()
        .checked_add(Duration::from_secs(946_080_000))
        .unwrap_or_else(Instant::now)
}
