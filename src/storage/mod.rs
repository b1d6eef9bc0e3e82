//! # Storage
//!
//! Directory layout and file system primitives for notes: locating a note
//! across the working, archive and trash directories, moving files between
//! them, and atomic whole-file writes.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

pub mod retention;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{
    config::Config,
    constants::{LOCK_FILE_EXTENSION, NOTE_FILE_EXTENSION},
    error::{Error, Result},
};

/// Where a note's file currently lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NoteState {
    #[default]
    Live,
    Archived,
    Trashed,
}

impl NoteState {
    /// Derives the state from the soft-state flags of a row or header.
    ///
    /// `deleted` wins if both are set, since a trashed note is on its way out.
    pub const fn from_flags(archived: bool, deleted: bool) -> Self {
        if deleted {
            Self::Trashed
        } else if archived {
            Self::Archived
        } else {
            Self::Live
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Archived => "archived",
            Self::Trashed => "trashed",
        }
    }
}

/// Resolved directories for one configuration.
#[derive(Debug, Clone)]
pub struct Layout {
    pub notes_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub trash_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub index_dir: PathBuf,
}

impl Layout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            notes_dir: config.zettel_path(),
            archive_dir: config.archive_path(),
            trash_dir: config.trash_path(),
            backup_dir: config.backup_path(),
            index_dir: config.index_path(),
        }
    }

    /// Creates every directory of the layout.
    pub fn ensure(&self) -> Result<()> {
        for dir in [
            &self.notes_dir,
            &self.archive_dir,
            &self.trash_dir,
            &self.backup_dir,
            &self.index_dir,
        ] {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        Ok(())
    }

    pub fn dir_for(&self, state: NoteState) -> &Path {
        match state {
            NoteState::Live => &self.notes_dir,
            NoteState::Archived => &self.archive_dir,
            NoteState::Trashed => &self.trash_dir,
        }
    }

    pub fn note_path(&self, state: NoteState, id: &str) -> PathBuf {
        self.dir_for(state).join(note_filename(id))
    }

    /// Path of the editor lock file for a note (always in the working directory).
    pub fn lock_path(&self, id: &str) -> PathBuf {
        self.notes_dir.join(format!("{id}.{LOCK_FILE_EXTENSION}"))
    }

    /// Finds the directory currently holding `<id>.md`.
    pub fn locate(&self, id: &str) -> Option<(NoteState, PathBuf)> {
        [NoteState::Live, NoteState::Archived, NoteState::Trashed]
            .into_iter()
            .map(|state| (state, self.note_path(state, id)))
            .find(|(_, path)| path.is_file())
    }

    /// True if `<id>.md` exists in the working or archive directory.
    pub fn note_exists(&self, id: &str) -> bool {
        self.note_path(NoteState::Live, id).is_file()
            || self.note_path(NoteState::Archived, id).is_file()
    }
}

/// File name of a note.
pub fn note_filename(id: &str) -> String {
    format!("{id}.{NOTE_FILE_EXTENSION}")
}

/// Extracts the note id from a `<id>.md` path.
pub fn note_id_from_path(path: &Path) -> Option<&str> {
    if path.extension().is_some_and(|ext| ext == NOTE_FILE_EXTENSION) {
        path.file_stem().and_then(|s| s.to_str())
    } else {
        None
    }
}

/// Walks the note files directly inside a directory.
pub fn walk_notes(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == NOTE_FILE_EXTENSION)
        })
        .map(walkdir::DirEntry::into_path)
}

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Writes `bytes` to `path` through a sibling temp file and a rename, so
/// readers never observe a partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("ztl");
    let tmp = dir.join(format!(".{name}.{:08x}.tmp", rand::random::<u32>()));

    let written = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(Error::io(path, e));
    }
    Ok(())
}

/// Moves a file, falling back to copy + remove when a plain rename fails
/// (for example across file systems).
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    if let Err(rename_err) = fs::rename(from, to) {
        if !from.is_file() {
            return Err(Error::io(from, rename_err));
        }
        fs::copy(from, to).map_err(|_| Error::io(from, rename_err))?;
        fs::remove_file(from).map_err(|e| Error::io(from, e))?;
    }

    tracing::debug!(from = %from.display(), to = %to.display(), "moved note file");
    Ok(())
}
