//! # Index Store
//!
//! Denormalized JSON side indexes kept next to the Markdown notes. Each
//! collection is one pretty-printed JSON array, rewritten whole through an
//! atomic temp-file rename on every change.
//!
//! Display ids (`n001`, `t001`, `s001`, `p001`, `task-001`) are allocated
//! here and nowhere else.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

mod cascade;
pub mod records;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

pub use self::{
    cascade::PurgeReport,
    records::{
        Link, Note, NoteTag, Project, ProjectNote, Source, SourceNote, SourceType, Tag, Task,
    },
};
use crate::{
    error::{Error, Result},
    storage,
};

/// Binding between a row type and its JSON collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// File name inside the index directory.
    const FILE: &'static str;

    /// Prefix of allocated display ids; `None` for edge collections.
    const ID_PREFIX: Option<&'static str> = None;

    fn allocated_id(&self) -> Option<&str> {
        None
    }

    fn assign_id(&mut self, _id: String) {}

    /// Equality key used to reject duplicates on insert.
    fn same_key(&self, other: &Self) -> bool;
}

/// Outcome of [`IndexStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inserted<R> {
    /// Appended with a freshly allocated id.
    New(R),
    /// A row with the same key already existed; nothing was written.
    Existing(R),
}

impl<R> Inserted<R> {
    pub fn into_inner(self) -> R {
        match self {
            Self::New(r) | Self::Existing(r) => r,
        }
    }

    pub const fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }
}

/// Extracts the numeric suffix of `id` if it is `prefix` followed by digits.
pub fn id_suffix(prefix: &str, id: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Formats a display id: zero-padded to three digits below 1000.
pub fn format_id(prefix: &str, n: u64) -> String {
    if n < 1000 {
        format!("{prefix}{n:03}")
    } else {
        format!("{prefix}{n}")
    }
}

/// Returns the id following the largest existing suffix.
pub fn allocate_id<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .filter_map(|id| id_suffix(prefix, id))
        .max()
        .unwrap_or(0);
    format_id(prefix, max + 1)
}

/// Handle on the index directory.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    /// Opens (and creates if needed) the index directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path<R: Record>(&self) -> PathBuf {
        self.dir.join(R::FILE)
    }

    /// Loads a collection, creating it as `[]` if absent.
    pub fn load<R: Record>(&self) -> Result<Vec<R>> {
        let path = self.path::<R>();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                storage::write_atomic(&path, b"[]\n")?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::io(&path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|source| Error::CorruptIndex { path, source })
    }

    /// Replaces a collection on disk.
    pub fn save<R: Record>(&self, rows: &[R]) -> Result<()> {
        let path = self.path::<R>();
        let mut json = serde_json::to_string_pretty(rows)
            .map_err(|source| Error::CorruptIndex {
                path: path.clone(),
                source,
            })?;
        json.push('\n');
        storage::write_atomic(&path, json.as_bytes())
    }

    /// Next display id for a collection with an id prefix.
    pub fn next_id<R: Record>(&self) -> Result<String> {
        let rows = self.load::<R>()?;
        Ok(Self::next_id_in(&rows))
    }

    fn next_id_in<R: Record>(rows: &[R]) -> String {
        let prefix = R::ID_PREFIX.unwrap_or_default();
        allocate_id(prefix, rows.iter().filter_map(Record::allocated_id))
    }

    /// Appends a row unless one with the same key exists.
    ///
    /// Collections with an id prefix get a freshly allocated id.
    pub fn insert<R: Record>(&self, mut record: R) -> Result<Inserted<R>> {
        let mut rows = self.load::<R>()?;

        if let Some(existing) = rows.iter().find(|row| row.same_key(&record)) {
            tracing::debug!(collection = R::FILE, "skipping duplicate insert");
            return Ok(Inserted::Existing(existing.clone()));
        }

        if R::ID_PREFIX.is_some() {
            record.assign_id(Self::next_id_in(&rows));
        }
        rows.push(record.clone());
        self.save(&rows)?;
        Ok(Inserted::New(record))
    }

    /// Loads a collection, applies `f`, and saves it back.
    pub fn update<R: Record, T>(&self, f: impl FnOnce(&mut Vec<R>) -> T) -> Result<T> {
        let mut rows = self.load::<R>()?;
        let out = f(&mut rows);
        self.save(&rows)?;
        Ok(out)
    }

    /// Removes rows not matching `keep`; returns how many were removed.
    ///
    /// The file is only rewritten if something was removed.
    pub fn retain<R: Record>(&self, mut keep: impl FnMut(&R) -> bool) -> Result<usize> {
        let mut rows = self.load::<R>()?;
        let before = rows.len();
        rows.retain(|row| keep(row));
        let removed = before - rows.len();
        if removed > 0 {
            self.save(&rows)?;
        }
        Ok(removed)
    }

    /// Creates every collection file that does not exist yet.
    pub fn ensure_all(&self) -> Result<()> {
        self.load::<Note>()?;
        self.load::<Tag>()?;
        self.load::<NoteTag>()?;
        self.load::<Link>()?;
        self.load::<Source>()?;
        self.load::<SourceNote>()?;
        self.load::<Project>()?;
        self.load::<ProjectNote>()?;
        self.load::<Task>()?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn note_by_seq(&self, seq_id: &str) -> Result<Note> {
        self.load::<Note>()?
            .into_iter()
            .find(|n| n.seq_id.eq_ignore_ascii_case(seq_id))
            .ok_or_else(|| Error::NotFound(format!("note {seq_id}")))
    }

    pub fn note_by_id(&self, id: &str) -> Result<Note> {
        self.load::<Note>()?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))
    }

    pub fn source(&self, source_id: &str) -> Result<Source> {
        self.load::<Source>()?
            .into_iter()
            .find(|s| s.source_id.eq_ignore_ascii_case(source_id))
            .ok_or_else(|| Error::NotFound(format!("source {source_id}")))
    }

    pub fn project(&self, project_id: &str) -> Result<Project> {
        self.load::<Project>()?
            .into_iter()
            .find(|p| p.project_id.eq_ignore_ascii_case(project_id))
            .ok_or_else(|| Error::NotFound(format!("project {project_id}")))
    }

    pub fn task(&self, task_id: &str) -> Result<Task> {
        self.load::<Task>()?
            .into_iter()
            .find(|t| t.id.eq_ignore_ascii_case(task_id))
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))
    }

    /// Finds a tag by name (case-insensitive).
    pub fn tag_named(&self, name: &str) -> Result<Option<Tag>> {
        let wanted = Tag::named(name);
        Ok(self
            .load::<Tag>()?
            .into_iter()
            .find(|t| t.same_key(&wanted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_id_padding() {
        assert_eq!(format_id("n", 1), "n001");
        assert_eq!(format_id("task-", 42), "task-042");
        assert_eq!(format_id("t", 999), "t999");
        assert_eq!(format_id("t", 1000), "t1000");
    }

    #[test]
    fn test_id_suffix_requires_exact_prefix() {
        assert_eq!(id_suffix("t", "t012"), Some(12));
        assert_eq!(id_suffix("t", "task-001"), None);
        assert_eq!(id_suffix("n", "n"), None);
        assert_eq!(id_suffix("n", "n1a"), None);
    }

    #[test]
    fn test_allocate_after_gap_uses_max() {
        assert_eq!(allocate_id("n", ["n001", "n007", "x999"]), "n008");
        assert_eq!(allocate_id("n", std::iter::empty()), "n001");
    }

    #[test]
    fn test_load_creates_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::open(tmp.path()).unwrap();
        let tags = store.load::<Tag>().unwrap();
        assert!(tags.is_empty());
        assert_eq!(fs::read_to_string(store.path::<Tag>()).unwrap().trim(), "[]");
    }

    #[test]
    fn test_corrupt_index_is_reported_and_kept() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::open(tmp.path()).unwrap();
        fs::write(store.path::<Tag>(), "{ not json").unwrap();

        let err = store.insert(Tag::named("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptIndex);
        assert_eq!(
            fs::read_to_string(store.path::<Tag>()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn test_insert_dedups_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::open(tmp.path()).unwrap();

        let first = store.insert(Tag::named("Memory")).unwrap();
        let second = store.insert(Tag::named("memory")).unwrap();

        assert!(first.is_new());
        assert!(!second.is_new());
        assert_eq!(second.into_inner().id, "t001");
        assert_eq!(store.load::<Tag>().unwrap().len(), 1);
    }

    #[test]
    fn test_edge_insert_has_no_id() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::open(tmp.path()).unwrap();
        let edge = NoteTag {
            note_id: "20240101120000".into(),
            tag_id: "t001".into(),
        };
        assert!(store.insert(edge.clone()).unwrap().is_new());
        assert!(!store.insert(edge).unwrap().is_new());
        assert_eq!(store.load::<NoteTag>().unwrap().len(), 1);
    }

    #[test]
    fn test_retain_reports_removed() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::open(tmp.path()).unwrap();
        for name in ["a", "b", "c"] {
            store.insert(Tag::named(name)).unwrap();
        }
        let removed = store.retain::<Tag>(|t| t.name != "b").unwrap();
        assert_eq!(removed, 1);
        let names: Vec<_> = store
            .load::<Tag>()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_ids_are_dense_from_empty(count in 1usize..40) {
            let tmp = TempDir::new().unwrap();
            let store = IndexStore::open(tmp.path()).unwrap();
            for i in 0..count {
                store.insert(Project { project_id: String::new(), name: format!("project {i}") }).unwrap();
            }
            let mut suffixes: Vec<u64> = store
                .load::<Project>()
                .unwrap()
                .iter()
                .filter_map(|p| id_suffix("p", &p.project_id))
                .collect();
            suffixes.sort_unstable();
            let expected: Vec<u64> = (1..=count as u64).collect();
            prop_assert_eq!(suffixes, expected);
        }

        #[test]
        fn prop_allocation_exceeds_existing(existing in prop::collection::btree_set(1u64..5000, 0..20)) {
            let ids: Vec<String> = existing.iter().map(|n| format_id("s", *n)).collect();
            let next = allocate_id("s", ids.iter().map(String::as_str));
            let next_n = id_suffix("s", &next).unwrap();
            prop_assert_eq!(next_n, existing.iter().max().copied().unwrap_or(0) + 1);
        }
    }
}
