//! # Sync Commands
//!
//! `sync push`, `sync pull` and `sync status` against the configured store.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::open_engine;
use crate::{
    sync::{store, ObjectStore, SyncEngine},
    ui,
};

/// Direction or inspection requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Push,
    Pull,
    Status,
}

/// Executes a sync action.
pub fn execute(action: SyncAction) -> Result<()> {
    let (config, engine) = open_engine()?;
    let remote = store::open(&config.sync)?;
    let location = remote.describe();
    let sync = SyncEngine::new(engine.layout(), remote);

    match action {
        SyncAction::Push => {
            let transfer = sync
                .push()
                .with_context(|| format!("Push to {location} failed"))?;
            for key in &transfer.files {
                println!("  {} {key}", "↑".green());
            }
            ui::print_success(&format!(
                "Pushed {} file(s) to {location}",
                transfer.files.len()
            ));
        }
        SyncAction::Pull => {
            let transfer = sync
                .pull()
                .with_context(|| format!("Pull from {location} failed"))?;
            for key in &transfer.files {
                println!("  {} {key}", "↓".green());
            }
            ui::print_success(&format!(
                "Pulled {} file(s) from {location}",
                transfer.files.len()
            ));
        }
        SyncAction::Status => {
            let status = sync
                .status()
                .with_context(|| format!("Cannot read {location}"))?;
            if status.is_clean() {
                ui::print_success("Up to date");
                return Ok(());
            }
            if !status.to_pull.is_empty() {
                println!("{}", "To pull:".bold());
                for key in &status.to_pull {
                    println!("  {key}");
                }
            }
            if !status.to_push.is_empty() {
                println!("{}", "To push:".bold());
                for key in &status.to_push {
                    println!("  {key}");
                }
            }
        }
    }
    Ok(())
}
