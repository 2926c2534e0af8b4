use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Point-in-time byte totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ByteCounts {
    pub read: u64,
    pub written: u64,
}

/// Read/write totals shared by every connection of one dialer.
///
/// Connections only ever add; [`ByteCounters::drain`] swaps both totals to
/// zero, so each added byte is reported by exactly one drain.
#[derive(Debug, Default)]
pub struct ByteCounters {
    read: AtomicU64,
    written: AtomicU64,
}

impl ByteCounters {
    pub(crate) fn add_read(&self, bytes: usize) {
        self.read.fetch_add(as_u64(bytes), Ordering::Relaxed);
    }

    pub(crate) fn add_written(&self, bytes: usize) {
        self.written.fetch_add(as_u64(bytes), Ordering::Relaxed);
    }

    /// Current totals without resetting them.
    #[must_use]
    pub fn load(&self) -> ByteCounts {
        ByteCounts {
            read: self.read.load(Ordering::Acquire),
            written: self.written.load(Ordering::Acquire),
        }
    }

    /// Takes the accumulated totals and resets both counters to zero.
    pub fn drain(&self) -> ByteCounts {
        let written = self.written.swap(0, Ordering::AcqRel);
        let read = self.read.swap(0, Ordering::AcqRel);
        ByteCounts { read, written }
    }
}

fn as_u64(bytes: usize) -> u64 {
    u64::try_from(bytes).unwrap_or(u64::MAX)
}

pin_project! {
    /// A connection that reports every transferred byte to its dialer.
    #[derive(Debug)]
    pub struct InstrumentedConnection<C> {
        #[pin]
        inner: C,
        counters: Arc<ByteCounters>,
    }
}

impl<C> InstrumentedConnection<C> {
    pub(crate) const fn new(inner: C, counters: Arc<ByteCounters>) -> Self {
        Self { inner, counters }
    }

    pub const fn get_ref(&self) -> &C {
        &self.inner
    }

    pub const fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: AsyncRead> AsyncRead for InstrumentedConnection<C> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();
        let before = buf.filled().len();
        let result = this.inner.poll_read(cx, buf);
        // Bytes filled before an error still crossed the wire.
        let read = buf.filled().len().saturating_sub(before);
        if read > 0 {
            this.counters.add_read(read);
        }
        result
    }
}

impl<C: AsyncWrite> AsyncWrite for InstrumentedConnection<C> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        let result = this.inner.poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = &result
            && *written > 0
        {
            this.counters.add_written(*written);
        }
        result
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        let result = this.inner.poll_write_vectored(cx, bufs);
        if let Poll::Ready(Ok(written)) = &result
            && *written > 0
        {
            this.counters.add_written(*written);
        }
        result
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }
}
