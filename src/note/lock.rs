//! # Edit Lock
//!
//! Cooperative single-writer lock held while a note is open in the editor.
//! The lock is a small YAML file `<id>.lock` next to the note; it is removed
//! when the guard drops, whatever the editor's outcome.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Contents of a lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    pub id: String,
    pub user: String,
    pub pid: u32,
    #[serde(with = "super::timestamp")]
    pub timestamp: NaiveDateTime,
}

impl LockInfo {
    fn current(id: &str) -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            id: id.to_string(),
            user,
            pid: std::process::id(),
            timestamp: Local::now().naive_local(),
        }
    }
}

/// Holds a note's lock file for as long as it lives.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    /// Creates the lock file, refusing with `Conflict` if it already exists.
    pub fn acquire(path: &Path, id: &str) -> Result<Self> {
        let info = LockInfo::current(id);
        let yaml = serde_yml::to_string(&info).map_err(|e| Error::BadInput(e.to_string()))?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::Conflict(describe_existing(path, id)));
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        let guard = Self {
            path: path.to_path_buf(),
        };
        file.write_all(yaml.as_bytes())
            .map_err(|e| Error::io(path, e))?;

        tracing::debug!(path = %path.display(), pid = info.pid, "acquired edit lock");
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove edit lock");
        }
    }
}

/// Reads an existing lock file, if any.
pub fn read(path: &Path) -> Option<LockInfo> {
    let content = fs::read_to_string(path).ok()?;
    serde_yml::from_str(&content).ok()
}

fn describe_existing(path: &Path, id: &str) -> String {
    read(path).map_or_else(
        || format!("note {id} is locked ({})", path.display()),
        |info| {
            format!(
                "note {id} is already being edited by {} (pid {}) since {}",
                info.user,
                info.pid,
                info.timestamp.format(crate::constants::TIMESTAMP_FORMAT)
            )
        },
    )
}
