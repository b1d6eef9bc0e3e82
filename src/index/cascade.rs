//! # Index Cascades
//!
//! Multi-collection updates keyed on a note id: soft-state mirroring,
//! permanent purge, and tag garbage collection.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::collections::{HashMap, HashSet};

use super::{
    IndexStore, Link, Note, NoteTag, ProjectNote, Record, SourceNote, Tag, Task,
};
use crate::{
    error::{Error, Result},
    storage::NoteState,
};

/// Outcome of a purge across all collections.
///
/// Each collection is processed even if an earlier one failed.
#[derive(Debug, Default)]
pub struct PurgeReport {
    /// Rows removed per collection file.
    pub removed: Vec<(&'static str, usize)>,
    /// Failures per collection file.
    pub failures: Vec<(&'static str, Error)>,
}

impl PurgeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn removed_from(&self, file: &str) -> usize {
        self.removed
            .iter()
            .filter(|(f, _)| *f == file)
            .map(|(_, n)| n)
            .sum()
    }

    fn record<R: Record>(&mut self, outcome: Result<usize>) {
        match outcome {
            Ok(n) => self.removed.push((R::FILE, n)),
            Err(e) => {
                tracing::warn!(collection = R::FILE, error = %e, "purge step failed");
                self.failures.push((R::FILE, e));
            }
        }
    }

    /// Turns a report with failures into an error summarizing them.
    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            return Ok(self);
        }
        let summary: Vec<String> = self
            .failures
            .iter()
            .map(|(file, e)| format!("{file}: {e}"))
            .collect();
        Err(Error::Conflict(format!(
            "purge incomplete; run `ztl link rebuild` after fixing: {}",
            summary.join("; ")
        )))
    }
}

impl IndexStore {
    /// Mirrors a note's file state into its row flags.
    pub fn set_soft_state(&self, note_id: &str, state: NoteState) -> Result<Note> {
        let updated = self.update::<Note, _>(|notes| {
            notes.iter_mut().find(|n| n.id == note_id).map(|note| {
                note.archived = state == NoteState::Archived;
                note.deleted = state == NoteState::Trashed;
                note.clone()
            })
        })?;
        updated.ok_or_else(|| Error::NotFound(format!("note {note_id}")))
    }

    /// Removes a note row and everything that refers to it, then collects
    /// orphaned tags.
    pub fn purge_note(&self, note_id: &str) -> PurgeReport {
        let mut report = PurgeReport::default();

        report.record::<Note>(self.retain::<Note>(|n| n.id != note_id));
        report.record::<NoteTag>(self.retain::<NoteTag>(|e| e.note_id != note_id));
        report.record::<Link>(self.retain::<Link>(|l| {
            l.source_note_id != note_id && l.target_note_id != note_id
        }));
        report.record::<SourceNote>(self.retain::<SourceNote>(|e| e.note_id != note_id));
        report.record::<ProjectNote>(self.retain::<ProjectNote>(|e| e.note_id != note_id));
        report.record::<Task>(self.retain::<Task>(|t| t.note_id != note_id));
        report.record::<Tag>(self.gc_tags());

        tracing::info!(note_id, clean = report.is_clean(), "purged note from index");
        report
    }

    /// Removes tags no NoteTag edge references; returns how many were removed.
    pub fn gc_tags(&self) -> Result<usize> {
        let used: HashSet<String> = self
            .load::<NoteTag>()?
            .into_iter()
            .map(|e| e.tag_id)
            .collect();
        let removed = self.retain::<Tag>(|t| used.contains(&t.id))?;
        if removed > 0 {
            tracing::debug!(removed, "collected unused tags");
        }
        Ok(removed)
    }

    /// Returns the existing tag with this name, creating it if needed.
    pub fn ensure_tag(&self, name: &str) -> Result<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::BadInput("tag name must not be empty".to_string()));
        }
        Ok(self.insert(Tag::named(name))?.into_inner())
    }

    /// Map of note id to the names of its tags.
    pub fn tag_names_by_note(&self) -> Result<HashMap<String, Vec<String>>> {
        let names: HashMap<String, String> = self
            .load::<Tag>()?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for edge in self.load::<NoteTag>()? {
            if let Some(name) = names.get(&edge.tag_id) {
                map.entry(edge.note_id).or_default().push(name.clone());
            }
        }
        Ok(map)
    }

    /// Number of NoteTag edges per tag id.
    pub fn tag_usage(&self) -> Result<HashMap<String, usize>> {
        let mut usage = HashMap::new();
        for edge in self.load::<NoteTag>()? {
            *usage.entry(edge.tag_id).or_insert(0) += 1;
        }
        Ok(usage)
    }
}
