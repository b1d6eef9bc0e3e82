//! # Remove, Archive and Restore Commands
//!
//! Soft-state transitions of a note, plus the permanent `remove --force`.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::Result;

use super::open_engine;
use crate::{error::Error, note::NoteType, storage::NoteState, ui};

/// Moves a note to the trash, or deletes it outright with `force`.
pub fn execute_remove(note_type: NoteType, seq_id: &str, force: bool) -> Result<()> {
    let (_config, engine) = open_engine()?;

    if !force {
        let note = engine.trash(seq_id, Some(note_type))?;
        ui::print_success(&format!("Moved {note_type} note {} to trash", note.seq_id));
        return Ok(());
    }

    let report = engine.purge(seq_id, Some(note_type))?;
    let warnings: Vec<String> = report
        .failures
        .iter()
        .map(|(file, e)| format!("{file}: {e:#}"))
        .collect();
    ui::print_warnings(&warnings);
    report.into_result()?;

    ui::print_success(&format!("Deleted {note_type} note {seq_id}"));
    Ok(())
}

/// Moves a live note to the archive.
pub fn execute_archive(note_type: NoteType, seq_id: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let note = engine.archive(seq_id, Some(note_type))?;
    ui::print_success(&format!("Archived {note_type} note {}", note.seq_id));
    Ok(())
}

/// Brings a trashed or archived note back to the working directory.
pub fn execute_restore(note_type: NoteType, seq_id: &str, trash: bool, archive: bool) -> Result<()> {
    let from = match (trash, archive) {
        (true, true) => {
            return Err(Error::Conflict(
                "--trash and --archive are mutually exclusive".to_string(),
            )
            .into());
        }
        (true, false) => Some(NoteState::Trashed),
        (false, true) => Some(NoteState::Archived),
        (false, false) => None,
    };

    let (_config, engine) = open_engine()?;
    let note = engine.restore(seq_id, Some(note_type), from)?;
    ui::print_success(&format!("Restored {note_type} note {}", note.seq_id));
    Ok(())
}
