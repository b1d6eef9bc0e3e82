//! # Init Command
//!
//! Writes the default configuration and creates the note directories.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::{config::Config, error::Error, index::IndexStore, storage::Layout};

/// Executes the init command.
pub fn execute(force: bool) -> Result<()> {
    let config_path = Config::path()?;

    let config = if config_path.is_file() {
        if !force {
            return Err(Error::Conflict(format!(
                "configuration already exists at {} (use --force to overwrite)",
                config_path.display()
            ))
            .into());
        }
        // keep the user's settings, fill in anything missing
        Config::load_from(&config_path).unwrap_or_default()
    } else {
        Config::default()
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    config.save_to(&config_path)?;

    let layout = Layout::from_config(&config);
    layout.ensure().context("Failed to create note directories")?;
    IndexStore::open(&layout.index_dir)?.ensure_all()?;

    println!("{} Initialized ztl", "✓".green());
    println!("  {} {}", "Config:".dimmed(), config_path.display());
    println!("  {} {}", "Notes:".dimmed(), layout.notes_dir.display());
    println!("  {} {}", "Index:".dimmed(), layout.index_dir.display());

    Ok(())
}
