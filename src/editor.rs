//! # Editor Integration
//!
//! Launches the user's preferred editor on a note file.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::{io::IsTerminal, path::Path, process::Command};

use crate::error::{Error, Result};

/// Splits an editor command such as `code --wait` or `"/opt/My Editor/bin/ed" -n`.
pub fn split_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = shlex::split(command)
        .ok_or_else(|| Error::BadInput(format!("cannot parse editor command: {command}")))?
        .into_iter();
    let program = parts
        .next()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::BadInput("empty editor command".to_string()))?;
    Ok((program, parts.collect()))
}

/// Opens a file in the editor and waits for it to exit.
///
/// The editor is only launched if stdout is a terminal.
pub fn open(path: &Path, command: &str) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        tracing::debug!(path = %path.display(), "not a terminal; skipping editor");
        return Ok(());
    }

    let (program, args) = split_command(command)?;
    let status = Command::new(&program)
        .args(&args)
        .arg(path)
        .status()
        .map_err(|e| Error::io(&program, e))?;

    if !status.success() {
        return Err(Error::BadInput(format!(
            "editor '{program}' exited with {status}"
        )));
    }
    Ok(())
}
