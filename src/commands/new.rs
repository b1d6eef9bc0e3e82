//! # New Command
//!
//! Creates a note of a given type.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::Result;
use owo_colors::OwoColorize;

use super::open_engine;
use crate::{
    lifecycle::NewNote,
    note::NoteType,
    storage::NoteState,
    ui,
};

/// Arguments for the new command
#[derive(Debug, Clone, Default)]
pub struct NewArgs {
    pub title: String,
    pub tags: Vec<String>,
    /// Source id (`index new --book`)
    pub book: Option<String>,
}

/// Executes the new command.
pub fn execute(note_type: NoteType, args: NewArgs) -> Result<()> {
    let (_config, engine) = open_engine()?;

    let note = engine.create(NewNote {
        note_type,
        title: args.title,
        tags: args.tags,
        source_id: args.book,
    })?;

    let path = engine.layout().note_path(NoteState::Live, &note.id);
    ui::print_success(&format!("Created {note_type} note {}", note.seq_id.bold()));
    println!("  {} {}", "File:".dimmed(), path.display());

    Ok(())
}
