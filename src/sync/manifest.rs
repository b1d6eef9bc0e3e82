//! # Manifests
//!
//! A manifest maps the file names of one synchronized directory to their
//! modification times, at whole-second precision. Comparing two manifests
//! tells which side holds the newer copy of each file.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::{collections::BTreeMap, fs, io, path::Path, time::SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    constants::SYNC_GRACE_SECONDS,
    error::{Result, SyncError},
    storage,
};

/// File name → last modification time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, DateTime<Utc>>,
}

/// Truncates a file time to whole seconds in UTC.
pub fn to_manifest_time(time: SystemTime) -> DateTime<Utc> {
    let time = DateTime::<Utc>::from(time);
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or(time)
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, modified: DateTime<Utc>) {
        self.entries.insert(name.into(), modified);
    }

    pub fn get(&self, name: &str) -> Option<DateTime<Utc>> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Builds a manifest from the top-level files of `dir` accepted by `include`.
    pub fn generate(dir: &Path, include: impl Fn(&str) -> bool) -> Result<Self> {
        let mut manifest = Self::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(manifest),
            Err(e) => return Err(SyncError::local_io(dir, e).into()),
        };

        for entry in entries {
            let entry = entry.map_err(|e| SyncError::local_io(dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !include(&name) {
                continue;
            }
            let metadata = entry
                .metadata()
                .map_err(|e| SyncError::local_io(entry.path(), e))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map_err(|e| SyncError::local_io(entry.path(), e))?;
            manifest.insert(name, to_manifest_time(modified));
        }
        Ok(manifest)
    }

    /// Names whose entry here is newer than in `other`: absent there, or
    /// ahead by more than the grace window.
    pub fn newer_than(&self, other: &Self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(name, mine)| {
                other.entries.get(*name).is_none_or(|theirs| {
                    (**mine - *theirs).num_seconds() > SYNC_GRACE_SECONDS
                })
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn from_bytes(key: &str, bytes: &[u8]) -> std::result::Result<Self, SyncError> {
        serde_json::from_slice(bytes).map_err(|source| SyncError::ManifestCorrupt {
            key: key.to_string(),
            source,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut json = serde_json::to_vec_pretty(&self.entries).unwrap_or_default();
        json.push(b'\n');
        json
    }

    /// Loads a manifest from disk; `None` if the file is absent.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(Self::from_bytes(&path.display().to_string(), &bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::local_io(path, e).into()),
        }
    }

    /// Loads a manifest, treating an absent or undecodable file as empty.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(manifest) => manifest.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable local manifest");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        storage::write_atomic(path, &self.to_bytes())
    }
}
