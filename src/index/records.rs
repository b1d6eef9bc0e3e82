//! # Index Records
//!
//! Row types of the nine JSON collections and their [`Record`] bindings:
//! file name, display-id prefix and de-duplication key.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Record;
use crate::{
    constants::{
        LINKS_FILE, NOTES_FILE, NOTE_TAGS_FILE, PROJECTS_FILE, PROJECT_NOTES_FILE, SOURCES_FILE,
        SOURCE_NOTES_FILE, TAGS_FILE, TASKS_FILE,
    },
    error::Error,
    note::{timestamp, NoteType, TaskStatus},
    storage::NoteState,
};

/// Cached metadata of one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub seq_id: String,
    pub title: String,
    pub note_type: NoteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub deleted: bool,
}

impl Note {
    pub const fn state(&self) -> NoteState {
        NoteState::from_flags(self.archived, self.deleted)
    }
}

impl Record for Note {
    const FILE: &'static str = NOTES_FILE;
    const ID_PREFIX: Option<&'static str> = Some("n");

    fn allocated_id(&self) -> Option<&str> {
        Some(&self.seq_id)
    }

    fn assign_id(&mut self, id: String) {
        self.seq_id = id;
    }

    fn same_key(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
        }
    }
}

impl Record for Tag {
    const FILE: &'static str = TAGS_FILE;
    const ID_PREFIX: Option<&'static str> = Some("t");

    fn allocated_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn same_key(&self, other: &Self) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTag {
    pub note_id: String,
    pub tag_id: String,
}

impl Record for NoteTag {
    const FILE: &'static str = NOTE_TAGS_FILE;

    fn same_key(&self, other: &Self) -> bool {
        self.note_id == other.note_id && self.tag_id == other.tag_id
    }
}

/// Directed edge between two notes, derived from their files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source_note_id: String,
    pub target_note_id: String,
}

impl Record for Link {
    const FILE: &'static str = LINKS_FILE;

    fn same_key(&self, other: &Self) -> bool {
        self == other
    }
}

/// Kind of bibliographic source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Book,
    Web,
    Paper,
    Video,
}

impl SourceType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Web => "web",
            Self::Paper => "paper",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "book" => Ok(Self::Book),
            "web" => Ok(Self::Web),
            "paper" => Ok(Self::Paper),
            "video" => Ok(Self::Video),
            other => Err(Error::BadInput(format!(
                "unknown source type '{other}' (expected book, web, paper or video)"
            ))),
        }
    }
}

/// Bibliographic reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub source_id: String,
    pub source_type: SourceType,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub url: String,
}

impl Record for Source {
    const FILE: &'static str = SOURCES_FILE;
    const ID_PREFIX: Option<&'static str> = Some("s");

    fn allocated_id(&self) -> Option<&str> {
        Some(&self.source_id)
    }

    fn assign_id(&mut self, id: String) {
        self.source_id = id;
    }

    fn same_key(&self, other: &Self) -> bool {
        self.source_type == other.source_type
            && self.title.to_lowercase() == other.title.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNote {
    pub source_id: String,
    pub note_id: String,
}

impl Record for SourceNote {
    const FILE: &'static str = SOURCE_NOTES_FILE;

    fn same_key(&self, other: &Self) -> bool {
        self.source_id == other.source_id && self.note_id == other.note_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub project_id: String,
    pub name: String,
}

impl Record for Project {
    const FILE: &'static str = PROJECTS_FILE;
    const ID_PREFIX: Option<&'static str> = Some("p");

    fn allocated_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }

    fn assign_id(&mut self, id: String) {
        self.project_id = id;
    }

    fn same_key(&self, other: &Self) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectNote {
    pub project_id: String,
    pub note_id: String,
}

impl Record for ProjectNote {
    const FILE: &'static str = PROJECT_NOTES_FILE;

    fn same_key(&self, other: &Self) -> bool {
        self.project_id == other.project_id && self.note_id == other.note_id
    }
}

/// Task row owned by a note of type `task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub note_id: String,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Record for Task {
    const FILE: &'static str = TASKS_FILE;
    const ID_PREFIX: Option<&'static str> = Some("task-");

    fn allocated_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn same_key(&self, other: &Self) -> bool {
        self.note_id == other.note_id
    }
}
