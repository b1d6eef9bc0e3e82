//! # List Command
//!
//! Lists notes of one type with state, text, tag and date filters.
//! Task listings pivot on the task table and show each task's status.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::collections::HashMap;

use anyhow::Result;

use super::{open_engine, sweep};
use crate::{
    constants::{DATE_FORMAT, DEFAULT_PAGE_SIZE, UI_TAGS_TRUNCATE_LEN, UI_TITLE_TRUNCATE_LEN},
    error::Error,
    index::{Note, Task},
    note::{NoteType, TaskStatus},
    query::{NoteQuery, Paginator},
    ui::{self, Table},
};

/// Filter options for listing
#[derive(Debug, Clone)]
pub struct ListArgs {
    pub tags: Vec<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub query: Option<String>,
    /// Page size; -1 shows everything
    pub limit: i64,
    pub trash: bool,
    pub archive: bool,
    /// Task status filter (task notes only)
    pub status: Option<String>,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            from: None,
            to: None,
            query: None,
            limit: DEFAULT_PAGE_SIZE,
            trash: false,
            archive: false,
            status: None,
        }
    }
}

/// Builds the query for a listing from command-line arguments.
pub fn build_query(note_type: NoteType, args: &ListArgs) -> crate::error::Result<NoteQuery> {
    let query = NoteQuery {
        state: NoteQuery::state_from_flags(args.trash, args.archive)?,
        note_type: Some(note_type),
        search: args.query.clone().filter(|q| !q.trim().is_empty()),
        tags: args.tags.clone(),
        ..NoteQuery::default()
    };
    query.with_dates(args.from.as_deref(), args.to.as_deref())
}

/// Executes the list command.
pub fn execute(note_type: NoteType, args: &ListArgs) -> Result<()> {
    let status = match (&args.status, note_type) {
        (None, _) => None,
        (Some(s), NoteType::Task) => Some(s.parse::<TaskStatus>()?),
        (Some(_), _) => {
            return Err(Error::BadInput("--status is only valid for task notes".to_string()).into());
        }
    };
    let query = build_query(note_type, args)?;
    let paginator = Paginator::new(args.limit)?;

    let (config, engine) = open_engine()?;
    sweep(&config, &engine)?;

    let index = engine.index();
    let tags_by_note = index.tag_names_by_note()?;
    let mut notes = query.apply(index.load::<Note>()?, &tags_by_note, |n| engine.body_of(n));

    if note_type == NoteType::Task {
        let tasks: HashMap<String, Task> = index
            .load::<Task>()?
            .into_iter()
            .map(|t| (t.note_id.clone(), t))
            .collect();
        notes.retain(|n| {
            tasks
                .get(&n.id)
                .is_some_and(|t| status.is_none_or(|s| t.status == s))
        });
        if notes.is_empty() {
            ui::print_empty("No tasks found.");
            return Ok(());
        }
        ui::print_paged(&notes, paginator, |page| {
            let mut table = Table::new(["ID", "TASK", "STATUS", "TITLE", "TAGS", "CREATED"]);
            for note in page {
                let task = tasks.get(&note.id);
                table.row([
                    note.seq_id.clone(),
                    task.map(|t| t.id.clone()).unwrap_or_default(),
                    task.map(|t| t.status.to_string()).unwrap_or_default(),
                    ui::truncate(&note.title, UI_TITLE_TRUNCATE_LEN),
                    tag_cell(&tags_by_note, note),
                    note.created_at.format(DATE_FORMAT).to_string(),
                ]);
            }
            table.print();
        })?;
        return Ok(());
    }

    if notes.is_empty() {
        ui::print_empty(&format!("No {note_type} notes found."));
        return Ok(());
    }
    ui::print_paged(&notes, paginator, |page| {
        let mut table = Table::new(["ID", "TITLE", "TAGS", "PROJECT", "CREATED"]);
        for note in page {
            table.row([
                note.seq_id.clone(),
                ui::truncate(&note.title, UI_TITLE_TRUNCATE_LEN),
                tag_cell(&tags_by_note, note),
                note.project_name.clone().unwrap_or_default(),
                note.created_at.format(DATE_FORMAT).to_string(),
            ]);
        }
        table.print();
    })?;

    Ok(())
}

fn tag_cell(tags_by_note: &HashMap<String, Vec<String>>, note: &Note) -> String {
    let tags = tags_by_note
        .get(&note.id)
        .map(|tags| tags.join(", "))
        .unwrap_or_default();
    ui::truncate(&tags, UI_TAGS_TRUNCATE_LEN)
}
