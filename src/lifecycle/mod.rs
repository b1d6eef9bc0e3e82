//! # Note Lifecycle
//!
//! State machine over a single note: create, edit, archive, trash, restore
//! and purge. Every transition moves the file first, then rewrites its
//! header, then mirrors the result into the index.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

mod relations;

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};

pub use self::relations::SourcePatch;
use crate::{
    config::Config,
    constants::{BACKUP_SUFFIX_FORMAT, NOTE_ID_FORMAT},
    error::{Error, Result},
    index::{IndexStore, Inserted, Note, NoteTag, PurgeReport, SourceNote, Task},
    note::{lock::LockGuard, CommonFields, Document, Header, NoteType, TaskStatus},
    storage::{self, Layout, NoteState},
};

/// Current local time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Request for a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub note_type: NoteType,
    pub title: String,
    pub tags: Vec<String>,
    /// Source to bind an index note to (`index new --book`)
    pub source_id: Option<String>,
}

impl NewNote {
    pub fn new(note_type: NoteType, title: impl Into<String>) -> Self {
        Self {
            note_type,
            title: title.into(),
            tags: Vec::new(),
            source_id: None,
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Notes, their files and their index rows.
#[derive(Debug, Clone)]
pub struct Engine {
    layout: Layout,
    index: IndexStore,
    backup_on_edit: bool,
}

impl Engine {
    pub const fn new(layout: Layout, index: IndexStore) -> Self {
        Self {
            layout,
            index,
            backup_on_edit: false,
        }
    }

    /// Copy each note into the backup directory before editing it.
    #[must_use]
    pub const fn with_backups(mut self, enabled: bool) -> Self {
        self.backup_on_edit = enabled;
        self
    }

    /// Builds an engine over the configured directories, creating them.
    pub fn from_config(config: &Config) -> Result<Self> {
        let layout = Layout::from_config(config);
        layout.ensure()?;
        let index = IndexStore::open(&layout.index_dir)?;
        Ok(Self::new(layout, index).with_backups(config.backup.enable))
    }

    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    pub const fn index(&self) -> &IndexStore {
        &self.index
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Finds a note by seq id, optionally requiring a note type.
    pub fn find(&self, seq_id: &str, note_type: Option<NoteType>) -> Result<Note> {
        let note = self.index.note_by_seq(seq_id)?;
        match note_type {
            Some(expected) if expected != note.note_type => Err(Error::NotFound(format!(
                "{expected} note {seq_id} ({seq_id} is a {} note)",
                note.note_type
            ))),
            _ => Ok(note),
        }
    }

    /// Path of the note's file in the directory matching its row state.
    pub fn note_file(&self, note: &Note) -> Result<PathBuf> {
        let path = self.layout.note_path(note.state(), &note.id);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::NotFound(format!(
                "file for note {} ({})",
                note.seq_id,
                path.display()
            )))
        }
    }

    pub fn read(&self, note: &Note) -> Result<Document> {
        Document::load(&self.note_file(note)?)
    }

    /// Body text used for searching: the file body if readable, else the cached content.
    pub fn body_of(&self, note: &Note) -> String {
        self.read(note)
            .map_or_else(|_| note.content.clone(), |doc| doc.body)
    }

    fn ensure_unlocked(&self, note: &Note) -> Result<()> {
        let lock = self.layout.lock_path(&note.id);
        if lock.exists() {
            return Err(Error::Conflict(format!(
                "note {} is being edited ({} exists)",
                note.seq_id,
                lock.display()
            )));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Picks a timestamp id not used by any row or file, moving forward a
    /// second at a time on collision.
    fn unique_id(&self, at: NaiveDateTime) -> Result<String> {
        let taken: HashSet<String> = self
            .index
            .load::<Note>()?
            .into_iter()
            .map(|n| n.id)
            .collect();

        let mut at = at;
        loop {
            let id = at.format(NOTE_ID_FORMAT).to_string();
            if !taken.contains(&id) && self.layout.locate(&id).is_none() {
                return Ok(id);
            }
            at += TimeDelta::seconds(1);
        }
    }

    /// Creates `<id>.md` in the working directory and indexes it.
    pub fn create(&self, request: NewNote) -> Result<Note> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::BadInput("title must not be empty".to_string()));
        }
        if request.source_id.is_some() && request.note_type != NoteType::Index {
            return Err(Error::BadInput(
                "--book is only valid for index notes".to_string(),
            ));
        }
        let source = request
            .source_id
            .as_deref()
            .map(|id| self.index.source(id))
            .transpose()?;
        let tags = normalize_tags(&request.tags)?;

        let created_at = now();
        let id = self.unique_id(created_at)?;
        let common = CommonFields {
            id: id.clone(),
            title: title.clone(),
            note_type: request.note_type,
            tags: tags.clone(),
            links: Vec::new(),
            project_name: None,
            created_at,
            updated_at: created_at,
            archived: false,
            deleted: false,
        };
        let doc = Document {
            header: Header::new(common),
            body: format!("## {title}"),
        };
        doc.save(&self.layout.note_path(NoteState::Live, &id))?;

        let note = self
            .index
            .insert(Note {
                id: id.clone(),
                seq_id: String::new(),
                title,
                note_type: request.note_type,
                project_name: None,
                content: doc.body.clone(),
                created_at,
                updated_at: created_at,
                archived: false,
                deleted: false,
            })?
            .into_inner();

        for tag in &tags {
            self.attach_tag(&id, tag)?;
        }
        if request.note_type == NoteType::Task {
            self.index.insert(Task {
                id: String::new(),
                note_id: id.clone(),
                status: TaskStatus::NotStarted,
            })?;
        }
        if let Some(source) = source {
            self.index.insert(SourceNote {
                source_id: source.source_id,
                note_id: id.clone(),
            })?;
        }

        tracing::info!(id = %note.id, seq_id = %note.seq_id, note_type = %note.note_type, "created note");
        Ok(note)
    }

    // -------------------------------------------------------------------------
    // Edit
    // -------------------------------------------------------------------------

    /// Edits a live note through `launch`, which receives the note path.
    ///
    /// The lock file exists for exactly as long as `launch` runs. Afterwards
    /// the header is refreshed and its changes propagate to the index.
    pub fn edit_with<F>(&self, seq_id: &str, note_type: Option<NoteType>, launch: F) -> Result<Note>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let note = self.find(seq_id, note_type)?;
        if note.state() != NoteState::Live {
            return Err(Error::Conflict(format!(
                "note {seq_id} is {}; restore it before editing",
                note.state().label()
            )));
        }
        let path = self.note_file(&note)?;

        let lock = LockGuard::acquire(&self.layout.lock_path(&note.id), &note.id)?;
        if self.backup_on_edit {
            self.backup(&note.id, &path)?;
        }
        launch(&path)?;
        drop(lock);

        self.absorb_edit(&note, &path)
    }

    /// Copies a note to `<backup_dir>/<id>_<timestamp>.md`.
    pub fn backup(&self, id: &str, path: &Path) -> Result<PathBuf> {
        let dir = &self.layout.backup_dir;
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        let dest = dir.join(format!("{id}_{}.md", now().format(BACKUP_SUFFIX_FORMAT)));
        fs::copy(path, &dest).map_err(|e| Error::io(&dest, e))?;
        tracing::debug!(backup = %dest.display(), "backed up note before edit");
        Ok(dest)
    }

    fn absorb_edit(&self, note: &Note, path: &Path) -> Result<Note> {
        let mut doc = Document::load(path)?;
        let common = doc.header.common_mut();
        if common.id != note.id {
            tracing::warn!(expected = %note.id, found = %common.id, "note id is immutable; restoring it");
            common.id.clone_from(&note.id);
        }
        common.updated_at = now();
        common.archived = false;
        common.deleted = false;
        common.tags = normalize_tags(&common.tags)?;
        let common = common.clone();
        doc.save(path)?;

        let body = doc.body.clone();
        let row = self
            .index
            .update::<Note, _>(|notes| {
                notes.iter_mut().find(|n| n.id == note.id).map(|row| {
                    row.title.clone_from(&common.title);
                    row.note_type = common.note_type;
                    row.project_name.clone_from(&common.project_name);
                    row.content.clone_from(&body);
                    row.updated_at = common.updated_at;
                    row.clone()
                })
            })?
            .ok_or_else(|| Error::NotFound(format!("note {}", note.id)))?;

        self.sync_tags(&note.id, &common.tags)?;
        self.sync_task(&row, doc.header.status())?;
        Ok(row)
    }

    /// Makes the note's NoteTag edges match `wanted`, then collects orphans.
    fn sync_tags(&self, note_id: &str, wanted: &[String]) -> Result<()> {
        let mut wanted_ids = HashSet::new();
        for name in wanted {
            wanted_ids.insert(self.attach_tag(note_id, name)?.id);
        }
        self.index
            .retain::<NoteTag>(|e| e.note_id != note_id || wanted_ids.contains(&e.tag_id))?;
        self.index.gc_tags()?;
        Ok(())
    }

    /// Keeps the Task row in step with the note type and header status.
    fn sync_task(&self, note: &Note, status: Option<TaskStatus>) -> Result<()> {
        if note.note_type != NoteType::Task {
            let removed = self.index.retain::<Task>(|t| t.note_id != note.id)?;
            if removed > 0 {
                tracing::info!(seq_id = %note.seq_id, "note is no longer a task; dropped task row");
            }
            return Ok(());
        }

        let status = status.unwrap_or_default();
        let inserted = self.index.insert(Task {
            id: String::new(),
            note_id: note.id.clone(),
            status,
        })?;
        if let Inserted::Existing(task) = inserted {
            if task.status != status {
                self.index.update::<Task, _>(|tasks| {
                    if let Some(row) = tasks.iter_mut().find(|t| t.id == task.id) {
                        row.status = status;
                    }
                })?;
            }
        }
        Ok(())
    }

    pub(crate) fn attach_tag(&self, note_id: &str, name: &str) -> Result<crate::index::Tag> {
        let tag = self.index.ensure_tag(name)?;
        self.index.insert(NoteTag {
            note_id: note_id.to_string(),
            tag_id: tag.id.clone(),
        })?;
        Ok(tag)
    }

    // -------------------------------------------------------------------------
    // Soft state
    // -------------------------------------------------------------------------

    /// Live → Archived.
    pub fn archive(&self, seq_id: &str, note_type: Option<NoteType>) -> Result<Note> {
        let note = self.find(seq_id, note_type)?;
        match note.state() {
            NoteState::Live => self.transition(&note, NoteState::Archived),
            other => Err(Error::Conflict(format!(
                "note {seq_id} is {}, only live notes can be archived",
                other.label()
            ))),
        }
    }

    /// Live → Trashed.
    pub fn trash(&self, seq_id: &str, note_type: Option<NoteType>) -> Result<Note> {
        let note = self.find(seq_id, note_type)?;
        match note.state() {
            NoteState::Live => self.transition(&note, NoteState::Trashed),
            other => Err(Error::Conflict(format!(
                "note {seq_id} is {}, only live notes can be removed",
                other.label()
            ))),
        }
    }

    /// {Trashed, Archived} → Live. `from` narrows which state is expected.
    pub fn restore(
        &self,
        seq_id: &str,
        note_type: Option<NoteType>,
        from: Option<NoteState>,
    ) -> Result<Note> {
        let note = self.find(seq_id, note_type)?;
        let state = note.state();
        if let Some(from) = from {
            if state != from {
                return Err(Error::NotFound(format!(
                    "{} note {seq_id}",
                    from.label()
                )));
            }
        }
        if state == NoteState::Live {
            return Err(Error::Conflict(format!(
                "note {seq_id} is already live"
            )));
        }
        self.transition(&note, NoteState::Live)
    }

    fn transition(&self, note: &Note, to: NoteState) -> Result<Note> {
        self.ensure_unlocked(note)?;
        let from = note.state();
        let src = self.note_file(note)?;
        let dest = self.layout.note_path(to, &note.id);
        if dest.exists() {
            return Err(Error::Conflict(format!(
                "{} already exists",
                dest.display()
            )));
        }

        storage::move_file(&src, &dest)?;

        let mut doc = Document::load(&dest)?;
        let header = doc.header.soft_state();
        match to {
            NoteState::Live => {
                header.clear_deleted();
                header.clear_archived();
            }
            NoteState::Archived => header.set_archived(),
            NoteState::Trashed => header.set_deleted(),
        }
        doc.save(&dest)?;

        let row = self.index.set_soft_state(&note.id, to)?;
        tracing::info!(seq_id = %note.seq_id, from = from.label(), to = to.label(), "moved note");
        Ok(row)
    }

    // -------------------------------------------------------------------------
    // Purge
    // -------------------------------------------------------------------------

    /// Deletes the note's file wherever it lives and removes it from every index.
    pub fn purge(&self, seq_id: &str, note_type: Option<NoteType>) -> Result<PurgeReport> {
        let note = self.find(seq_id, note_type)?;
        self.ensure_unlocked(&note)?;
        if let Some((_, path)) = self.layout.locate(&note.id) {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
        Ok(self.index.purge_note(&note.id))
    }
}

/// Trims tags, drops empties and case-insensitive duplicates, keeping order.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(Error::BadInput("tag name must not be empty".to_string()));
        }
        if seen.insert(tag.to_lowercase()) {
            out.push(tag.to_string());
        }
    }
    Ok(out)
}
