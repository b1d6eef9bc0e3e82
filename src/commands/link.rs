//! # Link Commands
//!
//! Rebuilds and lists the note link graph.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};

use super::{open_engine, sweep};
use crate::{
    constants::UI_TITLE_TRUNCATE_LEN,
    index::{Link, Note},
    links,
    query::{matches_any_tag, Paginator},
    storage::NoteState,
    ui::{self, Table},
};

/// Filter options for `link list`
#[derive(Debug, Clone)]
pub struct LinkListArgs {
    pub tag: Option<String>,
    pub query: Option<String>,
    pub only_linked: bool,
    pub limit: i64,
}

/// One output row: a source note and, if any, a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRow {
    pub source: Note,
    pub target: Option<Note>,
}

/// Builds the rows of `link list` from the current index.
///
/// `--tag` and `--query` match if either endpoint matches.
pub fn collect_rows(
    notes: &[Note],
    edges: &[Link],
    tags_by_note: &HashMap<String, Vec<String>>,
    args: &LinkListArgs,
) -> Vec<LinkRow> {
    let by_id: HashMap<&str, &Note> = notes.iter().map(|n| (n.id.as_str(), n)).collect();
    let tag_filter: Vec<String> = args.tag.iter().cloned().collect();
    let query = args.query.as_deref().map(str::to_lowercase);

    let note_matches = |note: &Note| {
        let tag_ok = tag_filter.is_empty()
            || tags_by_note
                .get(&note.id)
                .is_some_and(|tags| matches_any_tag(tags, &tag_filter));
        let query_ok = query
            .as_deref()
            .is_none_or(|q| note.title.to_lowercase().contains(q));
        tag_ok && query_ok
    };

    let mut rows = Vec::new();
    let mut linked: HashSet<&str> = HashSet::new();
    for edge in edges {
        let (Some(&source), Some(&target)) = (
            by_id.get(edge.source_note_id.as_str()),
            by_id.get(edge.target_note_id.as_str()),
        ) else {
            continue;
        };
        linked.insert(source.id.as_str());
        linked.insert(target.id.as_str());
        if note_matches(source) || note_matches(target) {
            rows.push(LinkRow {
                source: source.clone(),
                target: Some(target.clone()),
            });
        }
    }

    if !args.only_linked {
        for note in notes {
            if note.state() == NoteState::Live
                && !linked.contains(note.id.as_str())
                && note_matches(note)
            {
                rows.push(LinkRow {
                    source: note.clone(),
                    target: None,
                });
            }
        }
    }
    rows
}

/// Rebuilds the link index, then lists edges.
pub fn execute_list(args: &LinkListArgs) -> Result<()> {
    let paginator = Paginator::new(args.limit)?;
    let (config, engine) = open_engine()?;
    sweep(&config, &engine)?;
    links::rebuild(engine.layout(), engine.index()).context("Failed to rebuild link index")?;

    let index = engine.index();
    let notes = index.load::<Note>()?;
    let edges = index.load::<Link>()?;
    let rows = collect_rows(&notes, &edges, &index.tag_names_by_note()?, args);

    if rows.is_empty() {
        ui::print_empty("No links found.");
        return Ok(());
    }
    ui::print_paged(&rows, paginator, |page| {
        let mut table = Table::new(["FROM", "TITLE", "TO", "TITLE"]);
        for row in page {
            let (target_id, target_title) = row.target.as_ref().map_or_else(
                || (String::new(), String::new()),
                |t| (t.seq_id.clone(), ui::truncate(&t.title, UI_TITLE_TRUNCATE_LEN)),
            );
            table.row([
                row.source.seq_id.clone(),
                ui::truncate(&row.source.title, UI_TITLE_TRUNCATE_LEN),
                target_id,
                target_title,
            ]);
        }
        table.print();
    })?;
    Ok(())
}

/// Rebuilds the link index and reports what was found.
pub fn execute_rebuild() -> Result<()> {
    let (_config, engine) = open_engine()?;
    let summary = links::rebuild(engine.layout(), engine.index())?;
    ui::print_success(&format!(
        "Rebuilt links: {} edge(s) from {} note(s)",
        summary.edges, summary.scanned
    ));
    let mut warnings = Vec::new();
    if summary.dangling > 0 {
        warnings.push(format!("dropped {} dangling reference(s)", summary.dangling));
    }
    if summary.unreadable > 0 {
        warnings.push(format!("skipped {} unreadable note(s)", summary.unreadable));
    }
    ui::print_warnings(&warnings);
    Ok(())
}
