//! Numbered-choice prompt.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::error::InstallError;

/// Lists `options` and reads a 1-based selection from `input`.
///
/// Invalid answers re-prompt; end of input means nobody is there to answer
/// and fails with [`InstallError::NotInteractive`].
pub fn choose_with_io<R: BufRead, W: Write>(
    prompt: &str,
    options: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    writeln!(output, "{}", prompt)?;
    for (i, option) in options.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, option)?;
    }

    loop {
        write!(output, "Select [1-{}]: ", options.len())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(InstallError::NotInteractive.into());
        }

        match line.trim().parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
            _ => writeln!(output, "Invalid selection: {:?}", line.trim())?,
        }
    }
}
