use anyhow::Result;
use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use super::{CancelFlag, Progress, Spinner, Ui};
use crate::error::InstallError;

/// Renders nothing. Status lines and spinner labels are kept in memory, and
/// `choose` answers from a scripted queue or fails as non-interactive.
#[derive(Debug, Default)]
pub struct QuietUi {
    cancel: CancelFlag,
    lines: Mutex<Vec<String>>,
    spinners: Mutex<Vec<String>>,
    choices: Mutex<VecDeque<usize>>,
}

impl QuietUi {
    pub fn new(cancel: CancelFlag) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    /// Pre-answers the next `choose` calls, in order.
    pub fn with_choices(self, choices: impl IntoIterator<Item = usize>) -> Self {
        if let Ok(mut queue) = self.choices.lock() {
            queue.extend(choices);
        }
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn spinners(&self) -> Vec<String> {
        self.spinners.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Ui for QuietUi {
    fn println(&self, message: &str) {
        log::info!("{}", message);
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }

    fn spinner(&self, label: &str) -> Box<dyn Spinner> {
        log::debug!("{}", label);
        if let Ok(mut spinners) = self.spinners.lock() {
            spinners.push(label.to_string());
        }
        Box::new(Silent)
    }

    fn progress(&self, _total: u64, label: &str) -> Box<dyn Progress> {
        log::debug!("{}", label);
        Box::new(SilentProgress {
            cancel: self.cancel.clone(),
        })
    }

    fn choose(&self, _prompt: &str, options: &[String]) -> Result<usize> {
        let next = self.choices.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(idx) if idx < options.len() => Ok(idx),
            _ => Err(InstallError::NotInteractive.into()),
        }
    }
}

struct Silent;

impl Spinner for Silent {
    fn finish(self: Box<Self>) {}

    fn fail(self: Box<Self>) {}
}

struct SilentProgress {
    cancel: CancelFlag,
}

impl Progress for SilentProgress {
    fn check(&self) -> io::Result<()> {
        self.cancel.check()
    }

    fn inc(&self, _n: u64) -> io::Result<()> {
        self.cancel.check()
    }

    fn finish(self: Box<Self>) {}

    fn fail(self: Box<Self>) {}
}
