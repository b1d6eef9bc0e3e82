//! # Source Commands
//!
//! Bibliographic sources and their links to notes.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::Result;
use owo_colors::OwoColorize;

use super::{open_engine, sweep};
use crate::{
    constants::UI_TITLE_TRUNCATE_LEN,
    index::{Source, SourceNote, SourceType},
    lifecycle::SourcePatch,
    query::Paginator,
    ui::{self, Table},
};

/// Arguments for `source new`
#[derive(Debug, Clone)]
pub struct SourceArgs {
    pub source_type: SourceType,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub url: Option<String>,
}

pub fn execute_new(args: SourceArgs) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let source = engine.create_source(Source {
        source_id: String::new(),
        source_type: args.source_type,
        title: args.title.trim().to_string(),
        author: args.author.unwrap_or_default(),
        publisher: args.publisher.unwrap_or_default(),
        year: args.year,
        isbn: args.isbn.unwrap_or_default(),
        url: args.url.unwrap_or_default(),
    })?;
    ui::print_success(&format!(
        "Created {} source {}: {}",
        source.source_type,
        source.source_id.bold(),
        source.title
    ));
    Ok(())
}

pub fn execute_list(limit: i64) -> Result<()> {
    let paginator = Paginator::new(limit)?;
    let (config, engine) = open_engine()?;
    sweep(&config, &engine)?;

    let sources = engine.index().load::<Source>()?;
    let edges = engine.index().load::<SourceNote>()?;
    if sources.is_empty() {
        ui::print_empty("No sources found.");
        return Ok(());
    }

    ui::print_paged(&sources, paginator, |page| {
        let mut table = Table::new(["ID", "TYPE", "TITLE", "AUTHOR", "YEAR", "NOTES"]);
        for source in page {
            let notes = edges
                .iter()
                .filter(|e| e.source_id == source.source_id)
                .count();
            table.row([
                source.source_id.clone(),
                source.source_type.to_string(),
                ui::truncate(&source.title, UI_TITLE_TRUNCATE_LEN),
                source.author.clone(),
                source.year.map(|y| y.to_string()).unwrap_or_default(),
                notes.to_string(),
            ]);
        }
        table.print();
    })?;
    Ok(())
}

pub fn execute_show(source_id: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let (source, notes) = engine.source_notes(source_id)?;

    println!("{} {}", source.source_id.bold(), source.title.bold());
    println!("  {} {}", "type:".dimmed(), source.source_type);
    for (label, value) in [
        ("author:", source.author.as_str()),
        ("publisher:", source.publisher.as_str()),
        ("isbn:", source.isbn.as_str()),
        ("url:", source.url.as_str()),
    ] {
        if !value.is_empty() {
            println!("  {} {value}", label.dimmed());
        }
    }
    if let Some(year) = source.year {
        println!("  {} {year}", "year:".dimmed());
    }

    println!();
    if notes.is_empty() {
        ui::print_empty("No linked notes.");
        return Ok(());
    }
    let mut table = Table::new(["ID", "TYPE", "TITLE", "STATE"]);
    for note in &notes {
        table.row([
            note.seq_id.clone(),
            note.note_type.to_string(),
            ui::truncate(&note.title, UI_TITLE_TRUNCATE_LEN),
            note.state().label().to_string(),
        ]);
    }
    table.print();
    Ok(())
}

pub fn execute_edit(source_id: &str, patch: SourcePatch) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let source = engine.update_source(source_id, patch)?;
    ui::print_success(&format!("Updated source {}", source.source_id));
    Ok(())
}

pub fn execute_add_note(seq_id: &str, source_id: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let (note, source) = engine.link_source(seq_id, source_id)?;
    ui::print_success(&format!(
        "Attached note {} to source {}",
        note.seq_id, source.source_id
    ));
    Ok(())
}

pub fn execute_remove_note(seq_id: &str, source_id: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    engine.unlink_source(seq_id, source_id)?;
    ui::print_success(&format!("Detached note {seq_id} from source {source_id}"));
    Ok(())
}
