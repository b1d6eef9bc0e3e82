//! # Commands
//!
//! CLI command implementations for ztl.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

pub mod completions;
pub mod config;
pub mod init;
pub mod link;
pub mod list;
pub mod new;
pub mod project;
pub mod show;
pub mod source;
pub mod state;
pub mod sync;
pub mod tag;
pub mod task;

use anyhow::{Context, Result};

pub use self::{
    config::execute as config,
    init::execute as init,
    list::{execute as list, ListArgs},
    new::{execute as new, NewArgs},
    show::{execute_edit as edit, execute_show as show},
    state::{execute_archive as archive, execute_remove as remove, execute_restore as restore},
};
use crate::{config::Config, lifecycle::Engine, storage::retention};

/// Loads the configuration and opens the note engine over it.
pub(crate) fn open_engine() -> Result<(Config, Engine)> {
    let config = Config::load()?;
    let engine = Engine::from_config(&config).context("Failed to open the note directories")?;
    Ok((config, engine))
}

/// Retention pass run before every list-type command.
pub(crate) fn sweep(config: &Config, engine: &Engine) -> Result<()> {
    retention::sweep_all(config, engine.layout(), engine.index())
        .context("Retention sweep failed")?;
    Ok(())
}
