use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

use super::{CancelFlag, Progress, Spinner, Ui, choose_with_io};
use crate::error::InstallError;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(TICK_CHARS)
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.cyan} {msg} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_chars(TICK_CHARS)
        .progress_chars("━╸━")
}

/// Spinners and byte progress bars on the terminal.
pub struct TerminalUi {
    multi: MultiProgress,
    interactive: bool,
    cancel: CancelFlag,
}

impl TerminalUi {
    pub fn new(interactive: bool, cancel: CancelFlag) -> Self {
        Self {
            multi: MultiProgress::new(),
            interactive,
            cancel,
        }
    }
}

impl Ui for TerminalUi {
    fn println(&self, message: &str) {
        self.multi.suspend(|| println!("{}", message));
    }

    fn spinner(&self, label: &str) -> Box<dyn Spinner> {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(spinner_style());
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Box::new(TerminalSpinner {
            bar,
            label: label.to_string(),
        })
    }

    fn progress(&self, total: u64, label: &str) -> Box<dyn Progress> {
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(bar_style());
        bar.set_message(label.to_string());
        Box::new(TerminalProgress {
            bar,
            label: label.to_string(),
            cancel: self.cancel.clone(),
        })
    }

    fn choose(&self, prompt: &str, options: &[String]) -> Result<usize> {
        if !self.interactive {
            return Err(InstallError::NotInteractive.into());
        }
        self.multi.suspend(|| {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stderr();
            choose_with_io(prompt, options, &mut input, &mut output)
        })
    }
}

struct TerminalSpinner {
    bar: ProgressBar,
    label: String,
}

impl Spinner for TerminalSpinner {
    fn finish(self: Box<Self>) {
        self.bar.finish_and_clear();
    }

    fn fail(self: Box<Self>) {
        self.bar.abandon_with_message(format!("{} ✗", self.label));
    }
}

struct TerminalProgress {
    bar: ProgressBar,
    label: String,
    cancel: CancelFlag,
}

impl Progress for TerminalProgress {
    fn check(&self) -> io::Result<()> {
        self.cancel.check()
    }

    fn inc(&self, n: u64) -> io::Result<()> {
        self.cancel.check()?;
        self.bar.inc(n);
        Ok(())
    }

    fn finish(self: Box<Self>) {
        self.bar.finish_and_clear();
    }

    fn fail(self: Box<Self>) {
        self.bar.abandon_with_message(format!("{} ✗", self.label));
    }
}
