//! # Retention
//!
//! Time-based cleanup of the trash and backup directories. Files whose
//! modification time is older than the configured horizon are deleted;
//! trashed notes are also purged from the index.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use super::{note_id_from_path, Layout};
use crate::{
    config::Config,
    error::{Error, Result},
    index::IndexStore,
};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Retention horizon for a number of days; `None` when retention is disabled (0).
pub fn horizon(days: u32) -> Option<Duration> {
    (days > 0).then(|| Duration::from_secs(u64::from(days) * SECONDS_PER_DAY))
}

/// Deletes every regular file in `dir` modified before `cutoff`.
///
/// A missing directory is treated as empty. Returns the deleted paths.
pub fn sweep_before(dir: &Path, cutoff: SystemTime) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut removed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let metadata = entry.metadata().map_err(|e| Error::io(&path, e))?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().map_err(|e| Error::io(&path, e))?;
        if modified < cutoff {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}

/// Deletes files in `dir` older than `horizon`.
pub fn sweep(dir: &Path, horizon: Duration) -> Result<Vec<PathBuf>> {
    let cutoff = SystemTime::now()
        .checked_sub(horizon)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    sweep_before(dir, cutoff)
}

/// Result of one retention pass.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Note ids purged from the trash.
    pub purged: Vec<String>,
    /// Backup files deleted.
    pub backups: Vec<PathBuf>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.purged.is_empty() && self.backups.is_empty()
    }
}

/// Sweeps the trash older than `cutoff`, purging each note from the index.
///
/// Index failures are logged and do not stop the sweep.
pub fn sweep_trash_before(
    layout: &Layout,
    index: &IndexStore,
    cutoff: SystemTime,
) -> Result<Vec<String>> {
    let mut purged = Vec::new();
    for path in sweep_before(&layout.trash_dir, cutoff)? {
        let Some(id) = note_id_from_path(&path) else {
            continue;
        };
        let report = index.purge_note(id);
        if !report.is_clean() {
            tracing::warn!(id, failures = report.failures.len(), "trash sweep left index rows behind");
        }
        purged.push(id.to_string());
    }
    Ok(purged)
}

/// Runs the trash and backup sweeps with the configured horizons.
pub fn sweep_all(config: &Config, layout: &Layout, index: &IndexStore) -> Result<SweepReport> {
    let mut report = SweepReport::default();
    let now = SystemTime::now();

    if let Some(h) = horizon(config.trash.retention) {
        let cutoff = now.checked_sub(h).unwrap_or(SystemTime::UNIX_EPOCH);
        report.purged = sweep_trash_before(layout, index, cutoff)?;
    }
    if let Some(h) = horizon(config.backup.retention) {
        report.backups = sweep(&layout.backup_dir, h)?;
    }

    if !report.is_empty() {
        tracing::info!(
            purged = report.purged.len(),
            backups = report.backups.len(),
            "retention sweep"
        );
    }
    Ok(report)
}
