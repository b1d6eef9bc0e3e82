//! # Show and Edit Commands
//!
//! Prints a note, or opens it in the configured editor under an edit lock.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::open_engine;
use crate::{
    constants::TIMESTAMP_FORMAT,
    editor,
    index::{NoteTag, ProjectNote, SourceNote, Tag},
    note::NoteType,
    ui,
};

/// Executes the show command.
///
/// With `meta_only`, the body is omitted.
pub fn execute_show(note_type: NoteType, seq_id: &str, meta_only: bool) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let note = engine.find(seq_id, Some(note_type))?;
    let doc = engine.read(&note)?;
    let header = doc.header.common();

    let tag_names: Vec<String> = {
        let tags = engine.index().load::<Tag>()?;
        engine
            .index()
            .load::<NoteTag>()?
            .into_iter()
            .filter(|e| e.note_id == note.id)
            .filter_map(|e| tags.iter().find(|t| t.id == e.tag_id).map(|t| t.name.clone()))
            .collect()
    };
    let sources = engine
        .index()
        .load::<SourceNote>()?
        .into_iter()
        .filter(|e| e.note_id == note.id)
        .map(|e| e.source_id)
        .collect::<Vec<_>>();
    let in_projects = engine
        .index()
        .load::<ProjectNote>()?
        .into_iter()
        .filter(|e| e.note_id == note.id)
        .count();

    println!("{} {}", note.seq_id.bold(), header.title.bold());
    println!("  {} {}", "id:".dimmed(), header.id);
    println!("  {} {}", "type:".dimmed(), header.note_type);
    println!("  {} {}", "state:".dimmed(), note.state().label());
    if let Some(status) = doc.header.status() {
        println!("  {} {}", "status:".dimmed(), status);
    }
    println!("  {} {}", "tags:".dimmed(), tag_names.join(", "));
    if !header.links.is_empty() {
        println!("  {} {}", "links:".dimmed(), header.links.join(", "));
    }
    if let Some(project) = &header.project_name {
        println!("  {} {project} ({in_projects})", "project:".dimmed());
    }
    if !sources.is_empty() {
        println!("  {} {}", "sources:".dimmed(), sources.join(", "));
    }
    println!(
        "  {} {}",
        "created:".dimmed(),
        header.created_at.format(TIMESTAMP_FORMAT)
    );
    println!(
        "  {} {}",
        "updated:".dimmed(),
        header.updated_at.format(TIMESTAMP_FORMAT)
    );

    if !meta_only && !doc.body.is_empty() {
        println!();
        println!("{}", doc.body);
    }
    Ok(())
}

/// Executes the edit command.
pub fn execute_edit(note_type: NoteType, seq_id: &str) -> Result<()> {
    let (config, engine) = open_engine()?;
    let command = config.editor_command();

    let note = engine
        .edit_with(seq_id, Some(note_type), |path| editor::open(path, &command))
        .with_context(|| format!("Failed to edit {note_type} note {seq_id}"))?;

    ui::print_success(&format!("Updated {} note {}", note.note_type, note.seq_id));
    Ok(())
}
