//! # Tag Commands
//!
//! Adds and removes tags on notes and lists the tag vocabulary.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::Result;

use super::{open_engine, sweep};
use crate::{
    index::Tag,
    query::Paginator,
    ui::{self, Table},
};

pub fn execute_add(seq_id: &str, name: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    let tag = engine.add_tag(seq_id, name)?;
    ui::print_success(&format!("Tagged {seq_id} with '{}' ({})", tag.name, tag.id));
    Ok(())
}

pub fn execute_remove(seq_id: &str, name: &str) -> Result<()> {
    let (_config, engine) = open_engine()?;
    engine.remove_tag(seq_id, name)?;
    ui::print_success(&format!("Removed tag '{name}' from {seq_id}"));
    Ok(())
}

/// Lists tags with the number of notes using each.
pub fn execute_list(query: Option<&str>, limit: i64) -> Result<()> {
    let paginator = Paginator::new(limit)?;
    let (config, engine) = open_engine()?;
    sweep(&config, &engine)?;

    let usage = engine.index().tag_usage()?;
    let query = query.map(str::to_lowercase);
    let mut tags: Vec<(Tag, usize)> = engine
        .index()
        .load::<Tag>()?
        .into_iter()
        .filter(|t| {
            query
                .as_deref()
                .is_none_or(|q| t.name.to_lowercase().contains(q))
        })
        .map(|t| {
            let count = usage.get(&t.id).copied().unwrap_or(0);
            (t, count)
        })
        .collect();

    // Most used first, then alphabetically
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));

    if tags.is_empty() {
        ui::print_empty("No tags found.");
        return Ok(());
    }
    ui::print_paged(&tags, paginator, |page| {
        let mut table = Table::new(["ID", "TAG", "NOTES"]);
        for (tag, count) in page {
            table.row([tag.id.clone(), tag.name.clone(), count.to_string()]);
        }
        table.print();
    })?;
    Ok(())
}
