//! Command handlers. One module per subcommand.

use std::fs;
use std::io::{self, IsTerminal as _};
use std::path::Path;

use crate::error::{CliResult, IntoCli as _};

pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod plan;

/// `true` if `path` is a directory with at least one entry.
pub(crate) fn is_non_empty_dir(path: &Path) -> CliResult<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    let mut entries =
        fs::read_dir(path).with_cli_context(|| format!("Failed to read '{}'", path.display()))?;
    Ok(entries.next().is_some())
}

/// Ask a yes/no question. Defaults to "no"; always "no" without a terminal.
#[cfg(feature = "interactive")]
pub(crate) fn confirm(prompt: &str) -> CliResult<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false))
}

/// Ask a yes/no question. Defaults to "no"; always "no" without a terminal.
#[cfg(not(feature = "interactive"))]
pub(crate) fn confirm(prompt: &str) -> CliResult<bool> {
    use std::io::Write as _;

    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    eprint!("{prompt} [y/N] ");
    io::stderr()
        .flush()
        .with_cli_context(|| "Failed to flush stderr")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .with_cli_context(|| "Failed to read confirmation input")?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input == "y" || input == "yes")
}
