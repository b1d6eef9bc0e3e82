//! # Config Command
//!
//! Interactive editor for the configuration file.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::io::IsTerminal;

use anyhow::{Context, Result};

use crate::{
    config::Config,
    error::Error,
    storage::Layout,
    tui::{self, screens::ConfigForm},
    ui,
};

/// Opens the configuration form and saves the result.
///
/// Starts from the existing file when there is one, otherwise from the
/// defaults, so `ztl config` also works as a first-time setup.
pub fn execute() -> Result<()> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Err(Error::BadInput("ztl config needs an interactive terminal".to_string()).into());
    }

    let path = Config::path()?;
    let current = if path.exists() {
        Config::load_from(&path)?
    } else {
        Config::default()
    };

    let Some(updated) = tui::run(ConfigForm::new(current.clone()))? else {
        println!("Cancelled.");
        return Ok(());
    };
    if updated == current && path.exists() {
        println!("No changes.");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    updated.save_to(&path)?;
    Layout::from_config(&updated).ensure()?;
    ui::print_success(&format!("Saved {}", path.display()));
    Ok(())
}
