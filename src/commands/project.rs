//! # Project Commands
//!
//! Named projects grouping notes.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::Result;
use owo_colors::OwoColorize;

use super::{open_engine, sweep};
use crate::{
    constants::UI_TITLE_TRUNCATE_LEN,
    index::{Project, ProjectNote},
    ui::{self, Table},
};

pub fn execute_new(name: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let project = engine.create_project(name)?;
    ui::print_success(&format!(
        "Created project {}: {}",
        project.project_id.bold(),
        project.name
    ));
    Ok(())
}

pub fn execute_add(seq_id: &str, project_id: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let (note, project) = engine.add_to_project(seq_id, project_id)?;
    ui::print_success(&format!(
        "Added note {} to project {}",
        note.seq_id, project.name
    ));
    Ok(())
}

pub fn execute_list() -> Result<()> {
    let (config, engine) = open_engine()?;
    sweep(&config, &engine)?;

    let projects = engine.index().load::<Project>()?;
    let edges = engine.index().load::<ProjectNote>()?;
    if projects.is_empty() {
        ui::print_empty("No projects found.");
        return Ok(());
    }

    let mut table = Table::new(["ID", "NAME", "NOTES"]);
    for project in &projects {
        let count = edges
            .iter()
            .filter(|e| e.project_id == project.project_id)
            .count();
        table.row([
            project.project_id.clone(),
            project.name.clone(),
            count.to_string(),
        ]);
    }
    table.print();
    Ok(())
}

pub fn execute_show(project_id: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let (project, notes) = engine.project_notes(project_id)?;

    println!("{} {}", project.project_id.bold(), project.name.bold());
    if notes.is_empty() {
        ui::print_empty("No notes in this project.");
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
