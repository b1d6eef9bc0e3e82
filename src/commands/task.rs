//! # Task Command
//!
//! Updates the status of a task note.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::Result;

use super::open_engine;
use crate::{note::TaskStatus, ui};

/// Executes `task update <task-id> <status>`.
pub fn execute_update(task_id: &str, status: &str) -> Result<()> {
    let status: TaskStatus = status.parse()?;
    let (_config, engine) = open_engine()?;
    let task = engine.update_task_status(task_id, status)?;
    ui::print_success(&format!("Task {} is now {}", task.id, task.status));
    Ok(())
}
