use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Progress;

/// Set once the user interrupts; checked on every progress update.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The error a cancelled transfer surfaces as. Its kind is not
    /// `Interrupted`, which `write_all` and `io::copy` would retry.
    pub fn check(&self) -> io::Result<()> {
        if self.is_cancelled() {
            return Err(io::Error::other(CANCELLED));
        }
        Ok(())
    }
}

const CANCELLED: &str = "interrupted by user";

/// Whether `err` is the error of a cancelled transfer.
pub fn is_cancelled(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::Other && err.to_string() == CANCELLED
}

/// Forwards writes to `inner` and reports each written chunk to a progress
/// sink. A failing sink fails the write, and a cancelled sink fails it before
/// any byte reaches `inner`.
pub struct ProgressWriter<'p, W> {
    inner: W,
    progress: &'p dyn Progress,
}

impl<'p, W: Write> ProgressWriter<'p, W> {
    pub fn new(inner: W, progress: &'p dyn Progress) -> Self {
        Self { inner, progress }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ProgressWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.progress.check()?;
        let n = self.inner.write(buf)?;
        self.progress.inc(n as u64)?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
