//! # Link Index
//!
//! Rebuilds `links.json` from the notes on disk. Targets come from the
//! header `links` list and from Markdown links of the form
//! `[label](<14-digit id>.md)` in the body. Edges to notes that are neither
//! live nor archived are dropped.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;

use crate::{
    error::{Error, Result},
    index::{IndexStore, Link},
    note::Document,
    storage::{self, Layout},
};

/// Markdown link to another note: `[label](20240101120000.md)`.
const NOTE_LINK_PATTERN: &str = r"\[[^\]]*\]\((\d{14})\.md\)";

/// Extracts link targets from a note.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
}

impl LinkExtractor {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(NOTE_LINK_PATTERN)
            .map_err(|e| Error::BadInput(format!("invalid link pattern: {e}")))?;
        Ok(Self { pattern })
    }

    /// Ids referenced from the body, in order of first appearance.
    pub fn body_targets(&self, body: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.pattern
            .captures_iter(body)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }

    /// Header links followed by body links, without duplicates.
    pub fn targets(&self, doc: &Document) -> Vec<String> {
        let mut seen = HashSet::new();
        doc.header
            .common()
            .links
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .chain(self.body_targets(&doc.body))
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }
}

/// Outcome of a rebuild.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Notes scanned.
    pub scanned: usize,
    /// Edges written.
    pub edges: usize,
    /// References to notes that do not exist (or are trashed).
    pub dangling: usize,
    /// Files skipped because their header did not parse.
    pub unreadable: usize,
}

/// Scans the working and archive directories and overwrites `links.json`.
///
/// Running it twice over an unchanged tree yields the same file.
pub fn rebuild(layout: &Layout, index: &IndexStore) -> Result<RebuildSummary> {
    let extractor = LinkExtractor::new()?;
    let mut edges = BTreeSet::new();
    let mut summary = RebuildSummary::default();

    for dir in [&layout.notes_dir, &layout.archive_dir] {
        for path in storage::walk_notes(dir) {
            let Some(source) = storage::note_id_from_path(&path).map(str::to_string) else {
                continue;
            };
            let doc = match Document::load(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable note");
                    summary.unreadable += 1;
                    continue;
                }
            };
            summary.scanned += 1;

            for target in extractor.targets(&doc) {
                if target == source {
                    continue;
                }
                if layout.note_exists(&target) {
                    edges.insert(Link {
                        source_note_id: source.clone(),
                        target_note_id: target,
                    });
                } else {
                    tracing::debug!(%source, %target, "dropping dangling link");
                    summary.dangling += 1;
                }
            }
        }
    }

    let edges: Vec<Link> = edges.into_iter().collect();
    summary.edges = edges.len();
    index.save(&edges)?;
    tracing::info!(edges = summary.edges, dangling = summary.dangling, "rebuilt link index");
    Ok(summary)
}
