//! # Completions Command
//!
//! Generate shell completion scripts for various shells.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::io::{self, Write};

use anyhow::Result;
use clap::Command;
use clap_complete::{generate, Shell};

/// Writes the completion script for `shell` to stdout.
/// The `cmd` parameter should be the CLI command (from `Cli::command()`).
pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(generate_to_string(shell, cmd).as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Renders the completion script for `shell`.
pub fn generate_to_string(shell: Shell, cmd: &mut Command) -> String {
    let name = cmd.get_name().to_string();
    let mut buf = Vec::new();
    generate(shell, cmd, name, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
