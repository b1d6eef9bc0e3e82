//! # ztl
//!
//! A Zettelkasten manager for the command line.
//!
//! Notes are plain Markdown files with YAML front matter. A set of JSON
//! collections caches their metadata and records tags, links, sources,
//! projects and tasks, so the files stay the source of truth and the
//! indexes can be rebuilt or synchronized independently.
//!
//! ## Features
//!
//! - **Typed Notes**: fleeting, literature, permanent, index, structure and task
//! - **Soft States**: live, archived and trashed, with timed purging
//! - **Link Graph**: derived from `[text](<id>.md)` references in note bodies
//! - **Sync**: manifest-driven push/pull of notes and indexes
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

pub mod commands;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod index;
pub mod lifecycle;
pub mod links;
pub mod note;
pub mod query;
pub mod storage;
pub mod sync;
pub mod tui;
pub mod ui;

pub use config::{set_config_override, Config};
pub use error::{Error, ErrorKind, Result, SyncError};
