//! # Object Stores
//!
//! The remote side of sync, reduced to whole-object get and put by key.
//! Keys use `/` separators (`notes/<id>.md`, `json/notes.json`).
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{
    config::{expand_home, Config, SyncConfig, SyncPlatform},
    error::{Error, Result, SyncError},
};

/// Minimal blob store used by the sync engine.
pub trait ObjectStore {
    /// Fetches an object; `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, SyncError>;

    /// Creates or replaces an object.
    fn put(&self, key: &str, bytes: &[u8]) -> std::result::Result<(), SyncError>;

    /// Human-readable location for messages.
    fn describe(&self) -> String;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, SyncError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, bytes: &[u8]) -> std::result::Result<(), SyncError> {
        (**self).put(key, bytes)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Opens the store selected by the `[sync]` section.
pub fn open(config: &SyncConfig) -> Result<Box<dyn ObjectStore>> {
    let config_path = Config::path().unwrap_or_default();
    if !config.enable {
        return Err(Error::NotConfigured {
            path: config_path,
            reason: "sync is disabled; set [sync] enable = true".to_string(),
        });
    }
    if config.bucket.trim().is_empty() {
        return Err(Error::NotConfigured {
            path: config_path,
            reason: "sync.bucket is empty".to_string(),
        });
    }

    match config.platform {
        SyncPlatform::Local => Ok(Box::new(LocalObjectStore::new(expand_home(&config.bucket)))),
        SyncPlatform::S3 => Err(SyncError::RemoteUnavailable(format!(
            "bucket '{}': this build has no S3 client; mount the bucket and use platform = \"local\"",
            config.bucket
        ))
        .into()),
    }
}

// =============================================================================
// Directory-backed store
// =============================================================================

/// Treats a directory as the bucket. Keys map to relative paths.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> std::result::Result<PathBuf, SyncError> {
        let mut path = self.root.clone();
        for part in key.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return Err(SyncError::RemoteUnavailable(format!("invalid object key '{key}'")));
            }
            path.push(part);
        }
        Ok(path)
    }

    fn check_root(&self) -> std::result::Result<(), SyncError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(SyncError::RemoteUnavailable(format!(
                "{} is not a directory",
                self.root.display()
            )))
        }
    }
}

fn remote_error(key: &str, e: &io::Error) -> SyncError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => SyncError::AuthDenied(format!("{key}: {e}")),
        _ => SyncError::RemoteUnavailable(format!("{key}: {e}")),
    }
}

impl ObjectStore for LocalObjectStore {
    fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, SyncError> {
        self.check_root()?;
        let path = self.object_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(remote_error(key, &e)),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> std::result::Result<(), SyncError> {
        self.check_root()?;
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| remote_error(key, &e))?;
        }
        crate::storage::write_atomic(&path, bytes).map_err(|e| match e {
            Error::Io { source, .. } => remote_error(key, &source),
            other => SyncError::RemoteUnavailable(format!("{key}: {other}")),
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Shared in-memory bucket. Clones see the same objects, which lets two
/// engines act as separate machines against one remote.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.borrow_mut().remove(key)
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, SyncError> {
        Ok(self.objects.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, bytes: &[u8]) -> std::result::Result<(), SyncError> {
        self.objects
            .borrow_mut()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_local_store_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());

        assert!(store.get("notes/a.md").unwrap().is_none());
        store.put("notes/a.md", b"hello").unwrap();
        assert_eq!(store.get("notes/a.md").unwrap().unwrap(), b"hello");
        assert!(tmp.path().join("notes").join("a.md").is_file());
    }

    #[test]
    fn test_local_store_missing_root_unavailable() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path().join("gone"));
        assert!(matches!(
            store.get("notes/a.md"),
            Err(SyncError::RemoteUnavailable(_))
        ));
    }

    #[test]
    fn test_local_store_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());
        assert!(store.put("notes/../../etc", b"x").is_err());
    }

    #[test]
    fn test_open_requires_enable() {
        let config = SyncConfig::default();
        let err = open(&config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotConfigured);
    }

    #[test]
    fn test_open_s3_is_unavailable() {
        let config = SyncConfig {
            enable: true,
            platform: SyncPlatform::S3,
            bucket: "my-zettel".to_string(),
            ..SyncConfig::default()
        };
        let err = open(&config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn test_memory_store_clones_share_objects() {
        let a = MemoryObjectStore::new();
        let b = a.clone();
        a.put("json/notes.json", b"[]").unwrap();
        assert_eq!(b.keys(), vec!["json/notes.json"]);
    }
}
