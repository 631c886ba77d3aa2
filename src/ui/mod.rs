//! User-facing output: status lines, spinners, byte progress and the
//! interactive chooser.
//!
//! The pipeline only sees the [`Ui`] capability. [`TerminalUi`] renders with
//! `indicatif` on a dedicated thread; [`QuietUi`] renders nothing and is what
//! tests and `--quiet` runs use.

mod progress;
mod prompt;
mod quiet;
mod terminal;

use anyhow::Result;
use std::future::Future;
use std::io;

pub use progress::{CancelFlag, ProgressWriter, is_cancelled};
pub use prompt::choose_with_io;
pub use quiet::QuietUi;
pub use terminal::TerminalUi;

pub trait Ui: Send + Sync {
    fn println(&self, message: &str);

    fn spinner(&self, label: &str) -> Box<dyn Spinner>;

    fn progress(&self, total: u64, label: &str) -> Box<dyn Progress>;

    /// Asks the user to pick one of `options`, returning its index. Fails
    /// with `InstallError::NotInteractive` when there is no terminal.
    fn choose(&self, prompt: &str, options: &[String]) -> Result<usize>;
}

pub trait Spinner: Send {
    fn finish(self: Box<Self>);

    fn fail(self: Box<Self>);
}

/// Byte-level progress of one transfer.
pub trait Progress: Send + Sync {
    /// Fails once the transfer should stop, before more bytes are written.
    fn check(&self) -> io::Result<()>;

    /// Records `n` more bytes. An error aborts the transfer feeding it.
    fn inc(&self, n: u64) -> io::Result<()>;

    fn finish(self: Box<Self>);

    fn fail(self: Box<Self>);
}

/// Runs `f` under a spinner, finishing or failing it with the outcome.
pub fn with_spinner<T, F>(ui: &dyn Ui, label: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = ui.spinner(label);
    let result = f();
    match &result {
        Ok(_) => spinner.finish(),
        Err(_) => spinner.fail(),
    }
    result
}

/// Awaits `fut` under a spinner, finishing or failing it with the outcome.
pub async fn with_spinner_async<T, Fut>(ui: &dyn Ui, label: &str, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    let spinner = ui.spinner(label);
    let result = fut.await;
    match &result {
        Ok(_) => spinner.finish(),
        Err(_) => spinner.fail(),
    }
    result
}
