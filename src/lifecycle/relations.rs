//! # Note Relations
//!
//! Tags, projects, sources and task status: the operations that touch a
//! note's relationships rather than its soft state.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use super::{now, Engine};
use crate::{
    error::{Error, Result},
    index::{Note, NoteTag, Project, ProjectNote, Source, SourceNote, Tag, Task},
    note::{Document, Header, TaskStatus},
};

/// Field updates for `source edit`; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct SourcePatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub url: Option<String>,
}

impl SourcePatch {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.year.is_none()
            && self.isbn.is_none()
            && self.url.is_none()
    }

    fn apply(self, source: &mut Source) {
        if let Some(title) = self.title {
            source.title = title;
        }
        if let Some(author) = self.author {
            source.author = author;
        }
        if let Some(publisher) = self.publisher {
            source.publisher = publisher;
        }
        if self.year.is_some() {
            source.year = self.year;
        }
        if let Some(isbn) = self.isbn {
            source.isbn = isbn;
        }
        if let Some(url) = self.url {
            source.url = url;
        }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl Engine {
    /// Loads a note's document for a header edit outside the editor.
    ///
    /// Fails with a conflict while the note is open in the editor.
    fn open_header(&self, note: &Note) -> Result<(std::path::PathBuf, Document)> {
        self.ensure_unlocked(note)?;
        let path = self.note_file(note)?;
        let doc = Document::load(&path)?;
        Ok((path, doc))
    }

    // -------------------------------------------------------------------------
    // Tags
    // -------------------------------------------------------------------------

    /// Adds a tag to a note's header and index.
    pub fn add_tag(&self, seq_id: &str, name: &str) -> Result<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::BadInput("tag name must not be empty".to_string()));
        }
        let note = self.index.note_by_seq(seq_id)?;
        let (path, mut doc) = self.open_header(&note)?;

        let tags = &mut doc.header.common_mut().tags;
        if !tags.iter().any(|t| same_name(t, name)) {
            tags.push(name.to_string());
            doc.save(&path)?;
        }

        let tag = self.attach_tag(&note.id, name)?;
        tracing::info!(seq_id = %note.seq_id, tag = %tag.name, "tagged note");
        Ok(tag)
    }

    /// Removes a tag from a note, collecting the tag if nothing else uses it.
    pub fn remove_tag(&self, seq_id: &str, name: &str) -> Result<()> {
        let note = self.index.note_by_seq(seq_id)?;
        let (path, mut doc) = self.open_header(&note)?;

        let tags = &mut doc.header.common_mut().tags;
        let before = tags.len();
        tags.retain(|t| !same_name(t, name));
        let in_header = tags.len() != before;

        let tag = self.index.tag_named(name)?;
        let has_edge = match &tag {
            Some(tag) => self
                .index
                .load::<NoteTag>()?
                .iter()
                .any(|e| e.note_id == note.id && e.tag_id == tag.id),
            None => false,
        };

        if !in_header && !has_edge {
            return Err(Error::NotFound(format!("tag '{name}' on note {seq_id}")));
        }
        if in_header {
            doc.save(&path)?;
        }
        if let Some(tag) = tag {
            self.index
                .retain::<NoteTag>(|e| !(e.note_id == note.id && e.tag_id == tag.id))?;
        }
        self.index.gc_tags()?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Projects
    // -------------------------------------------------------------------------

    /// Creates a project; names are unique case-insensitively.
    pub fn create_project(&self, name: &str) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::BadInput("project name must not be empty".to_string()));
        }
        let inserted = self.index.insert(Project {
            project_id: String::new(),
            name: name.to_string(),
        })?;
        if !inserted.is_new() {
            return Err(Error::Conflict(format!("project '{name}' already exists")));
        }
        Ok(inserted.into_inner())
    }

    /// Adds a note to a project and records the project name in its header.
    pub fn add_to_project(&self, seq_id: &str, project_id: &str) -> Result<(Note, Project)> {
        let project = self.index.project(project_id)?;
        let note = self.index.note_by_seq(seq_id)?;
        let (path, mut doc) = self.open_header(&note)?;

        self.index.insert(ProjectNote {
            project_id: project.project_id.clone(),
            note_id: note.id.clone(),
        })?;

        doc.header.common_mut().project_name = Some(project.name.clone());
        doc.save(&path)?;

        let row = self
            .index
            .update::<Note, _>(|notes| {
                notes.iter_mut().find(|n| n.id == note.id).map(|row| {
                    row.project_name = Some(project.name.clone());
                    row.clone()
                })
            })?
            .ok_or_else(|| Error::NotFound(format!("note {seq_id}")))?;

        tracing::info!(seq_id = %row.seq_id, project = %project.name, "added note to project");
        Ok((row, project))
    }

    /// Notes belonging to a project, in index order.
    pub fn project_notes(&self, project_id: &str) -> Result<(Project, Vec<Note>)> {
        let project = self.index.project(project_id)?;
        let members: Vec<String> = self
            .index
            .load::<ProjectNote>()?
            .into_iter()
            .filter(|e| e.project_id == project.project_id)
            .map(|e| e.note_id)
            .collect();
        let notes = self
            .index
            .load::<Note>()?
            .into_iter()
            .filter(|n| members.contains(&n.id))
            .collect();
        Ok((project, notes))
    }

    // -------------------------------------------------------------------------
    // Sources
    // -------------------------------------------------------------------------

    /// Adds a source; (type, title) is unique case-insensitively.
    pub fn create_source(&self, source: Source) -> Result<Source> {
        if source.title.trim().is_empty() {
            return Err(Error::BadInput("source title must not be empty".to_string()));
        }
        let inserted = self.index.insert(source)?;
        if !inserted.is_new() {
            let existing = inserted.into_inner();
            return Err(Error::Conflict(format!(
                "{} source '{}' already exists as {}",
                existing.source_type, existing.title, existing.source_id
            )));
        }
        Ok(inserted.into_inner())
    }

    pub fn update_source(&self, source_id: &str, patch: SourcePatch) -> Result<Source> {
        if patch.is_empty() {
            return Err(Error::BadInput("nothing to update".to_string()));
        }
        let current = self.index.source(source_id)?;
        let mut updated = current.clone();
        patch.apply(&mut updated);
        if updated.title.trim().is_empty() {
            return Err(Error::BadInput("source title must not be empty".to_string()));
        }

        let clash = self
            .index
            .load::<Source>()?
            .into_iter()
            .find(|s| s.source_id != current.source_id && crate::index::Record::same_key(s, &updated));
        if let Some(other) = clash {
            return Err(Error::Conflict(format!(
                "{} source '{}' already exists as {}",
                other.source_type, other.title, other.source_id
            )));
        }

        self.index.update::<Source, _>(|rows| {
            if let Some(row) = rows.iter_mut().find(|s| s.source_id == current.source_id) {
                *row = updated.clone();
            }
        })?;
        Ok(updated)
    }

    /// Binds a note to a source.
    pub fn link_source(&self, seq_id: &str, source_id: &str) -> Result<(Note, Source)> {
        let source = self.index.source(source_id)?;
        let note = self.index.note_by_seq(seq_id)?;
        let inserted = self.index.insert(SourceNote {
            source_id: source.source_id.clone(),
            note_id: note.id.clone(),
        })?;
        if !inserted.is_new() {
            return Err(Error::Conflict(format!(
                "note {seq_id} is already attached to source {}",
                source.source_id
            )));
        }
        Ok((note, source))
    }

    /// Unbinds a note from a source.
    pub fn unlink_source(&self, seq_id: &str, source_id: &str) -> Result<()> {
        let source = self.index.source(source_id)?;
        let note = self.index.note_by_seq(seq_id)?;
        let removed = self
            .index
            .retain::<SourceNote>(|e| !(e.source_id == source.source_id && e.note_id == note.id))?;
        if removed == 0 {
            return Err(Error::NotFound(format!(
                "note {seq_id} on source {}",
                source.source_id
            )));
        }
        Ok(())
    }

    /// Notes bound to a source, in index order.
    pub fn source_notes(&self, source_id: &str) -> Result<(Source, Vec<Note>)> {
        let source = self.index.source(source_id)?;
        let members: Vec<String> = self
            .index
            .load::<SourceNote>()?
            .into_iter()
            .filter(|e| e.source_id == source.source_id)
            .map(|e| e.note_id)
            .collect();
        let notes = self
            .index
            .load::<Note>()?
            .into_iter()
            .filter(|n| members.contains(&n.id))
            .collect();
        Ok((source, notes))
    }

    // -------------------------------------------------------------------------
    // Tasks
    // -------------------------------------------------------------------------

    /// Sets a task's status in both its note header and the task row.
    pub fn update_task_status(&self, task_id: &str, status: TaskStatus) -> Result<Task> {
        let task = self.index.task(task_id)?;
        let note = self.index.note_by_id(&task.note_id)?;
        let (path, mut doc) = self.open_header(&note)?;

        match &mut doc.header {
            Header::Task(header) => header.status = status,
            Header::Note(_) => {
                return Err(Error::BadInput(format!(
                    "note {} is not a task note",
                    note.seq_id
                )));
            }
        }
        let updated_at = now();
        doc.header.common_mut().updated_at = updated_at;
        doc.save(&path)?;

        let row = self
            .index
            .update::<Task, _>(|tasks| {
                tasks.iter_mut().find(|t| t.id == task.id).map(|row| {
                    row.status = status;
                    row.clone()
                })
            })?
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
        self.index.update::<Note, _>(|notes| {
            if let Some(row) = notes.iter_mut().find(|n| n.id == note.id) {
                row.updated_at = updated_at;
            }
        })?;

        tracing::info!(task_id = %row.id, status = %status, "updated task status");
        Ok(row)
    }
}
