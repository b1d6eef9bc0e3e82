//! # Sync
//!
//! Manifest-driven, last-writer-wins replication of the working directory
//! and the index directory to an object store. Each side keeps a manifest
//! of file modification times; only files newer on one side than on the
//! other are transferred.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

pub mod manifest;
pub mod store;

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

pub use self::{
    manifest::Manifest,
    store::{LocalObjectStore, MemoryObjectStore, ObjectStore},
};
use crate::{
    constants::{JSON_MANIFEST, JSON_PREFIX, NOTES_MANIFEST, NOTES_PREFIX, NOTE_FILE_EXTENSION},
    error::{Error, Result, SyncError},
    storage::{self, Layout},
};

/// One synchronized directory and its manifest.
#[derive(Debug, Clone)]
struct Tree {
    prefix: &'static str,
    dir: PathBuf,
    manifest_name: &'static str,
    manifest_path: PathBuf,
    extension: &'static str,
}

impl Tree {
    fn notes(layout: &Layout) -> Self {
        Self {
            prefix: NOTES_PREFIX,
            dir: layout.notes_dir.clone(),
            manifest_name: NOTES_MANIFEST,
            manifest_path: layout.index_dir.join(NOTES_MANIFEST),
            extension: NOTE_FILE_EXTENSION,
        }
    }

    fn json(layout: &Layout) -> Self {
        Self {
            prefix: JSON_PREFIX,
            dir: layout.index_dir.clone(),
            manifest_name: JSON_MANIFEST,
            manifest_path: layout.index_dir.join(JSON_MANIFEST),
            extension: "json",
        }
    }

    /// Top-level files with the tree's extension, never a manifest.
    fn includes(&self, name: &str) -> bool {
        is_plain_name(name)
            && name != NOTES_MANIFEST
            && name != JSON_MANIFEST
            && Path::new(name)
                .extension()
                .is_some_and(|ext| ext == self.extension)
    }

    fn key(&self, name: &str) -> String {
        format!("{}/{name}", self.prefix)
    }

    fn manifest_key(&self) -> String {
        self.key(self.manifest_name)
    }

    fn local_manifest(&self) -> Result<Manifest> {
        Manifest::generate(&self.dir, |name| self.includes(name))
    }
}

/// A bare file name: no separators, no hidden or parent entries.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
}

/// What a push or pull transferred, as remote keys.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub files: Vec<String>,
}

/// Pending work in each direction, as remote keys.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    /// Newer on the remote than in the last pulled manifest.
    pub to_pull: Vec<String>,
    /// Newer locally than on the remote.
    pub to_push: Vec<String>,
}

impl SyncStatus {
    pub fn is_clean(&self) -> bool {
        self.to_pull.is_empty() && self.to_push.is_empty()
    }
}

/// Replicates a layout's notes and indexes to an object store.
pub struct SyncEngine<S: ObjectStore> {
    store: S,
    trees: [Tree; 2],
}

impl<S: ObjectStore> SyncEngine<S> {
    pub fn new(layout: &Layout, store: S) -> Self {
        Self {
            store,
            trees: [Tree::notes(layout), Tree::json(layout)],
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    fn remote_manifest(&self, tree: &Tree) -> std::result::Result<Manifest, SyncError> {
        let key = tree.manifest_key();
        match self.store.get(&key)? {
            Some(bytes) => Manifest::from_bytes(&key, &bytes),
            None => Ok(Manifest::new()),
        }
    }

    /// Uploads every local file newer than the remote copy, then the manifests.
    pub fn push(&self) -> Result<Transfer> {
        let mut transfer = Transfer::default();
        let mut fresh = Vec::with_capacity(self.trees.len());

        for tree in &self.trees {
            let local = tree.local_manifest()?;
            let remote = match self.remote_manifest(tree) {
                Ok(remote) => remote,
                Err(e @ SyncError::ManifestCorrupt { .. }) => {
                    tracing::warn!(error = %e, "remote manifest is corrupt; regenerating it");
                    Manifest::new()
                }
                Err(e) => return Err(e.into()),
            };

            for name in local.newer_than(&remote) {
                let path = tree.dir.join(&name);
                let bytes = fs::read(&path).map_err(|e| SyncError::local_io(&path, e))?;
                let key = tree.key(&name);
                self.store.put(&key, &bytes)?;
                tracing::info!(%key, "uploaded");
                transfer.files.push(key);
            }
            fresh.push(local);
        }

        for (tree, local) in self.trees.iter().zip(&fresh) {
            local.save(&tree.manifest_path).map_err(into_local_io)?;
            self.store.put(&tree.manifest_key(), &local.to_bytes())?;
        }
        Ok(transfer)
    }

    /// Downloads every remote file newer than the last pulled manifest.
    pub fn pull(&self) -> Result<Transfer> {
        let mut transfer = Transfer::default();
        let mut remotes = Vec::with_capacity(self.trees.len());
        for tree in &self.trees {
            remotes.push(self.remote_manifest(tree)?);
        }

        for (tree, remote) in self.trees.iter().zip(&remotes) {
            let local = Manifest::load_or_empty(&tree.manifest_path);
            for name in remote.newer_than(&local) {
                if !tree.includes(&name) {
                    tracing::warn!(%name, prefix = tree.prefix, "skipping unexpected manifest entry");
                    continue;
                }
                let key = tree.key(&name);
                let bytes = self
                    .store
                    .get(&key)?
                    .ok_or_else(|| SyncError::ObjectNotFound(key.clone()))?;

                let path = tree.dir.join(&name);
                fs::create_dir_all(&tree.dir).map_err(|e| SyncError::local_io(&tree.dir, e))?;
                storage::write_atomic(&path, &bytes).map_err(into_local_io)?;
                if let Some(modified) = remote.get(&name) {
                    set_modified(&path, SystemTime::from(modified))?;
                }
                tracing::info!(%key, "downloaded");
                transfer.files.push(key);
            }
            remote.save(&tree.manifest_path).map_err(into_local_io)?;
        }
        Ok(transfer)
    }

    /// Compares both sides without transferring anything.
    pub fn status(&self) -> Result<SyncStatus> {
        let mut status = SyncStatus::default();
        for tree in &self.trees {
            let remote = self.remote_manifest(tree)?;
            let pulled = Manifest::load_or_empty(&tree.manifest_path);
            let local = tree.local_manifest()?;

            status
                .to_pull
                .extend(remote.newer_than(&pulled).iter().map(|n| tree.key(n)));
            status
                .to_push
                .extend(local.newer_than(&remote).iter().map(|n| tree.key(n)));
        }
        Ok(status)
    }
}

fn set_modified(path: &Path, time: SystemTime) -> Result<()> {
    fs::File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(time))
        .map_err(|e| SyncError::local_io(path, e).into())
}

fn into_local_io(e: Error) -> Error {
    match e {
        Error::Io { path, source } => SyncError::LocalIo { path, source }.into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn machine() -> (TempDir, Layout) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let layout = Layout {
            notes_dir: root.join("zk"),
            archive_dir: root.join("archive"),
            trash_dir: root.join("trash"),
            backup_dir: root.join("backup"),
            index_dir: root.join("data"),
        };
        layout.ensure().unwrap();
        (tmp, layout)
    }

    #[test]
    fn test_push_uploads_files_then_manifests() {
        let (_tmp, layout) = machine();
        fs::write(layout.notes_dir.join("20240101120000.md"), "note").unwrap();
        fs::write(layout.notes_dir.join("20240101120000.lock"), "lock").unwrap();
        fs::write(layout.index_dir.join("notes.json"), "[]").unwrap();

        let remote = MemoryObjectStore::new();
        let engine = SyncEngine::new(&layout, remote.clone());
        let pushed = engine.push().unwrap();

        assert_eq!(
            pushed.files,
            vec!["notes/20240101120000.md", "json/notes.json"]
        );
        assert_eq!(
            remote.keys(),
            vec![
                "json/metadata_json.json",
                "json/notes.json",
                "notes/20240101120000.md",
                "notes/metadata_notes.json",
            ]
        );
        assert!(layout.index_dir.join(NOTES_MANIFEST).is_file());
        assert!(engine.push().unwrap().files.is_empty());
    }

    #[test]
    fn test_push_regenerates_corrupt_remote_manifest() {
        let (_tmp, layout) = machine();
        fs::write(layout.notes_dir.join("20240101120000.md"), "note").unwrap();
        let remote = MemoryObjectStore::new();
        remote.put("notes/metadata_notes.json", b"{oops").unwrap();

        let pushed = SyncEngine::new(&layout, remote.clone()).push().unwrap();
        assert_eq!(pushed.files, vec!["notes/20240101120000.md"]);
        let bytes = remote.get("notes/metadata_notes.json").unwrap().unwrap();
        assert_eq!(Manifest::from_bytes("k", &bytes).unwrap().len(), 1);
    }

    #[test]
    fn test_pull_refuses_corrupt_manifest() {
        let (_tmp, layout) = machine();
        let remote = MemoryObjectStore::new();
        remote.put("json/metadata_json.json", b"not json").unwrap();

        let err = SyncEngine::new(&layout, remote).pull().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(matches!(
            err,
            Error::Remote(SyncError::ManifestCorrupt { .. })
        ));
    }

    #[test]
    fn test_pull_missing_object_is_fatal() {
        let (_tmp, a) = machine();
        let (_tmp_b, b) = machine();
        fs::write(a.notes_dir.join("20240101120000.md"), "note").unwrap();
        let remote = MemoryObjectStore::new();
        SyncEngine::new(&a, remote.clone()).push().unwrap();
        remote.remove("notes/20240101120000.md");

        let err = SyncEngine::new(&b, remote).pull().unwrap_err();
        assert!(matches!(err, Error::Remote(SyncError::ObjectNotFound(_))));
    }

    #[test]
    fn test_two_machines_converge() {
        let (_tmp_a, a) = machine();
        let (_tmp_b, b) = machine();
        let remote = MemoryObjectStore::new();
        fs::write(a.notes_dir.join("20240101120000.md"), "from a").unwrap();
        fs::write(a.index_dir.join("notes.json"), "[]\n").unwrap();

        let engine_a = SyncEngine::new(&a, remote.clone());
        let engine_b = SyncEngine::new(&b, remote.clone());
        engine_a.push().unwrap();

        let status = engine_b.status().unwrap();
        assert_eq!(
            status.to_pull,
            vec!["notes/20240101120000.md", "json/notes.json"]
        );

        let pulled = engine_b.pull().unwrap();
        assert_eq!(pulled.files.len(), 2);
        assert_eq!(
            fs::read_to_string(b.notes_dir.join("20240101120000.md")).unwrap(),
            "from a"
        );

        // pulled files carry the remote timestamps, so nothing bounces back
        assert!(engine_b.pull().unwrap().files.is_empty());
        assert!(engine_b.push().unwrap().files.is_empty());
        assert!(engine_b.status().unwrap().is_clean());
    }

    #[test]
    fn test_local_directory_store_end_to_end() {
        let (_tmp, layout) = machine();
        let bucket = TempDir::new().unwrap();
        fs::write(layout.notes_dir.join("20240101120000.md"), "x").unwrap();

        SyncEngine::new(&layout, LocalObjectStore::new(bucket.path()))
            .push()
            .unwrap();
        assert!(bucket.path().join("notes/20240101120000.md").is_file());
        assert!(bucket.path().join("json/metadata_json.json").is_file());
    }
}
