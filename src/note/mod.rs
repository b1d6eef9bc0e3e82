//! # Note
//!
//! Markdown notes with YAML front matter. Plain notes and task notes carry
//! distinct header types that share [`CommonFields`]; the [`FrontMatter`]
//! trait exposes the soft-state transitions for both.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

pub mod lock;
pub mod parser;

use std::{fmt, path::Path, str::FromStr};

use chrono::NaiveDateTime;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    storage,
};

/// Kind of a note.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Fleeting,
    Literature,
    Permanent,
    Index,
    Structure,
    Task,
}

impl NoteType {
    pub const ALL: [Self; 6] = [
        Self::Fleeting,
        Self::Literature,
        Self::Permanent,
        Self::Index,
        Self::Structure,
        Self::Task,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fleeting => "fleeting",
            Self::Literature => "literature",
            Self::Permanent => "permanent",
            Self::Index => "index",
            Self::Structure => "structure",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::BadInput(format!("unknown note type '{s}'")))
    }
}

/// Progress of a task note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not started")]
    NotStarted,
    #[serde(rename = "In progress")]
    InProgress,
    Waiting,
    #[serde(rename = "On hold")]
    OnHold,
    Done,
}

impl TaskStatus {
    pub const ALL: [Self; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Waiting,
        Self::OnHold,
        Self::Done,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Waiting => "Waiting",
            Self::OnHold => "On hold",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    /// Accepts any casing and `-`/`_` in place of spaces (`in-progress`).
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().to_lowercase() == wanted)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|s| s.as_str()).collect();
                Error::BadInput(format!(
                    "unknown task status '{s}' (expected one of: {})",
                    valid.join(", ")
                ))
            })
    }
}

/// Serde helpers for `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::constants::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}

/// Hand-written headers often leave 14-digit ids unquoted; YAML then reads
/// them as integers. These helpers accept both.
mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        Str(String),
        Int(u64),
    }

    impl From<StringOrInt> for String {
        fn from(value: StringOrInt) -> Self {
            match value {
                StringOrInt::Str(s) => s,
                StringOrInt::Int(n) => n.to_string(),
            }
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        StringOrInt::deserialize(deserializer).map(String::from)
    }

    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let values = Option::<Vec<StringOrInt>>::deserialize(deserializer)?;
        Ok(values
            .unwrap_or_default()
            .into_iter()
            .map(String::from)
            .collect())
    }
}

/// Fields present in every header variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFields {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    pub title: String,
    pub note_type: NoteType,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub deleted: bool,
}

/// Header of fleeting, literature, permanent, index and structure notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteHeader {
    #[serde(flatten)]
    pub common: CommonFields,
}

/// Header of task notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHeader {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(default)]
    pub status: TaskStatus,
}

/// Capability shared by all header variants.
///
/// `archived` and `deleted` are mutually exclusive; setting one clears the other.
pub trait FrontMatter: Serialize + DeserializeOwned {
    fn common(&self) -> &CommonFields;
    fn common_mut(&mut self) -> &mut CommonFields;

    fn set_deleted(&mut self) {
        let common = self.common_mut();
        common.deleted = true;
        common.archived = false;
    }

    fn set_archived(&mut self) {
        let common = self.common_mut();
        common.archived = true;
        common.deleted = false;
    }

    fn clear_deleted(&mut self) {
        self.common_mut().deleted = false;
    }

    fn clear_archived(&mut self) {
        self.common_mut().archived = false;
    }
}

impl FrontMatter for NoteHeader {
    fn common(&self) -> &CommonFields {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonFields {
        &mut self.common
    }
}

impl FrontMatter for TaskHeader {
    fn common(&self) -> &CommonFields {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonFields {
        &mut self.common
    }
}

/// Header of a note whose type is only known after reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Note(NoteHeader),
    Task(TaskHeader),
}

impl Header {
    /// Builds the header variant matching `common.note_type`.
    pub fn new(common: CommonFields) -> Self {
        if common.note_type == NoteType::Task {
            Self::Task(TaskHeader {
                common,
                status: TaskStatus::default(),
            })
        } else {
            Self::Note(NoteHeader { common })
        }
    }

    pub const fn common(&self) -> &CommonFields {
        match self {
            Self::Note(h) => &h.common,
            Self::Task(h) => &h.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut CommonFields {
        match self {
            Self::Note(h) => &mut h.common,
            Self::Task(h) => &mut h.common,
        }
    }

    pub fn soft_state(&mut self) -> &mut dyn SoftState {
        match self {
            Self::Note(h) => h,
            Self::Task(h) => h,
        }
    }

    pub const fn status(&self) -> Option<TaskStatus> {
        match self {
            Self::Note(_) => None,
            Self::Task(h) => Some(h.status),
        }
    }
}

/// Object-safe view of the soft-state operations of [`FrontMatter`].
pub trait SoftState {
    fn set_deleted(&mut self);
    fn set_archived(&mut self);
    fn clear_deleted(&mut self);
    fn clear_archived(&mut self);
}

impl<T: FrontMatter> SoftState for T {
    fn set_deleted(&mut self) {
        FrontMatter::set_deleted(self);
    }

    fn set_archived(&mut self) {
        FrontMatter::set_archived(self);
    }

    fn clear_deleted(&mut self) {
        FrontMatter::clear_deleted(self);
    }

    fn clear_archived(&mut self) {
        FrontMatter::clear_archived(self);
    }
}

#[derive(Deserialize)]
struct TypeProbe {
    note_type: NoteType,
}

/// A parsed note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub header: Header,
    pub body: String,
}

impl Document {
    /// Parses a note, choosing the header variant from its `note_type`.
    pub fn parse(content: &str) -> Result<Self> {
        let (probe, _) = parser::parse::<TypeProbe>(content)?;
        let (header, body) = if probe.note_type == NoteType::Task {
            let (h, body) = parser::parse::<TaskHeader>(content)?;
            (Header::Task(h), body)
        } else {
            let (h, body) = parser::parse::<NoteHeader>(content)?;
            (Header::Note(h), body)
        };
        Ok(Self { header, body })
    }

    pub fn render(&self) -> Result<String> {
        match &self.header {
            Header::Note(h) => parser::serialize(h, &self.body),
            Header::Task(h) => parser::serialize(h, &self.body),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = storage::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            Error::NoFrontMatter => {
                Error::InvalidFrontMatter(format!("{}: no front matter", path.display()))
            }
            Error::InvalidFrontMatter(reason) => {
                Error::InvalidFrontMatter(format!("{}: {reason}", path.display()))
            }
            other => other,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        storage::write_atomic(path, self.render()?.as_bytes())
    }
}
