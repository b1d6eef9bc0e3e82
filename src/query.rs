//! # Query and Filter
//!
//! Note filtering used by the list commands. Filters apply in a fixed
//! order: soft state, type, text search, tags, then creation date range.
//! Every active filter narrows the result.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    constants::DATE_FORMAT,
    error::{Error, Result},
    index::Note,
    note::NoteType,
    storage::NoteState,
};

// =============================================================================
// Filter Criteria
// =============================================================================

/// Filter criteria for note listings. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    pub state: NoteState,
    pub note_type: Option<NoteType>,
    /// Case-insensitive substring over title and body.
    pub search: Option<String>,
    /// Any-of tag filter (case-insensitive).
    pub tags: Vec<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl NoteQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft state selected by the mutually exclusive `--trash`/`--archive` flags.
    pub fn state_from_flags(trash: bool, archive: bool) -> Result<NoteState> {
        match (trash, archive) {
            (true, true) => Err(Error::Conflict(
                "--trash and --archive are mutually exclusive".to_string(),
            )),
            (true, false) => Ok(NoteState::Trashed),
            (false, true) => Ok(NoteState::Archived),
            (false, false) => Ok(NoteState::Live),
        }
    }

    /// Sets the date range from `--from`/`--to` strings.
    pub fn with_dates(mut self, from: Option<&str>, to: Option<&str>) -> Result<Self> {
        self.from = from.map(parse_date).transpose()?;
        self.to = to.map(parse_date).transpose()?;
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(Error::BadInput(format!(
                    "--from {from} is after --to {to}"
                )));
            }
        }
        Ok(self)
    }

    /// Filters `notes`, keeping their order.
    ///
    /// `tags_by_note` maps note ids to tag names. `body_of` is only called
    /// for notes that survive the cheaper filters.
    pub fn apply<F>(
        &self,
        notes: Vec<Note>,
        tags_by_note: &HashMap<String, Vec<String>>,
        body_of: F,
    ) -> Vec<Note>
    where
        F: Fn(&Note) -> String,
    {
        notes
            .into_iter()
            .filter(|n| n.state() == self.state)
            .filter(|n| self.note_type.is_none_or(|t| t == n.note_type))
            .filter(|n| {
                self.search
                    .as_deref()
                    .is_none_or(|q| matches_search_text(&n.title, &body_of(n), q))
            })
            .filter(|n| {
                self.tags.is_empty()
                    || tags_by_note
                        .get(&n.id)
                        .is_some_and(|tags| matches_any_tag(tags, &self.tags))
            })
            .filter(|n| within_range(n.created_at.date(), self.from, self.to))
            .collect()
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| Error::BadInput(format!("invalid date '{value}' (expected YYYY-MM-DD)")))
}

/// Checks if title or body contain the query (case-insensitive).
pub fn matches_search_text(title: &str, body: &str, query: &str) -> bool {
    let query_lower = query.to_lowercase();
    title.to_lowercase().contains(&query_lower) || body.to_lowercase().contains(&query_lower)
}

/// Checks if any of `note_tags` is one of `filter_tags` (case-insensitive).
pub fn matches_any_tag(note_tags: &[String], filter_tags: &[String]) -> bool {
    filter_tags.iter().any(|filter| {
        let filter = filter.to_lowercase();
        note_tags.iter().any(|t| t.to_lowercase() == filter)
    })
}

/// Inclusive range check; open ends match everything.
pub fn within_range(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
}

// =============================================================================
// Pagination
// =============================================================================

/// Splits a result set into pages.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: Option<usize>,
}

impl Paginator {
    /// `limit` of `-1` (or any negative value) puts everything on one page.
    pub fn new(limit: i64) -> Result<Self> {
        if limit == 0 {
            return Err(Error::BadInput("--limit must not be 0".to_string()));
        }
        Ok(Self {
            page_size: usize::try_from(limit).ok(),
        })
    }

    pub fn pages<'a, T>(&self, items: &'a [T]) -> Vec<&'a [T]> {
        match self.page_size {
            _ if items.is_empty() => Vec::new(),
            Some(size) => items.chunks(size).collect(),
            None => vec![items],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn note(id: &str, title: &str, created: &str, state: NoteState) -> Note {
        let at = NaiveDateTime::parse_from_str(&format!("{created} 09:00:00"), "%Y-%m-%d %H:%M:%S")
            .unwrap();
        Note {
            id: id.to_string(),
            seq_id: format!("n{id}"),
            title: title.to_string(),
            note_type: NoteType::Fleeting,
            project_name: None,
            content: format!("## {title}"),
            created_at: at,
            updated_at: at,
            archived: state == NoteState::Archived,
            deleted: state == NoteState::Trashed,
        }
    }

    fn sample() -> Vec<Note> {
        vec![
            note("1", "Rust ownership", "2024-01-01", NoteState::Live),
            note("2", "Zettelkasten method", "2024-01-15", NoteState::Live),
            note("3", "Rust lifetimes", "2024-02-01", NoteState::Archived),
            note("4", "Old draft", "2024-02-02", NoteState::Trashed),
        ]
    }

    fn tags() -> HashMap<String, Vec<String>> {
        HashMap::from([
            ("1".to_string(), vec!["rust".to_string()]),
            ("2".to_string(), vec!["method".to_string()]),
        ])
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_default_is_live_only() {
        let out = NoteQuery::new().apply(sample(), &tags(), |n| n.content.clone());
        assert_eq!(ids(&out), vec!["1", "2"]);
    }

    #[test]
    fn test_state_flags_exclusive() {
        assert!(NoteQuery::state_from_flags(true, true).is_err());
        assert_eq!(
            NoteQuery::state_from_flags(false, true).unwrap(),
            NoteState::Archived
        );
    }

    #[test]
    fn test_search_and_tag_intersect() {
        let query = NoteQuery {
            search: Some("RUST".into()),
            tags: vec!["method".into()],
            ..NoteQuery::default()
        };
        assert!(query.apply(sample(), &tags(), |n| n.content.clone()).is_empty());

        let query = NoteQuery {
            search: Some("rust".into()),
            tags: vec!["Rust".into(), "other".into()],
            ..NoteQuery::default()
        };
        assert_eq!(ids(&query.apply(sample(), &tags(), |n| n.content.clone())), vec!["1"]);
    }

    #[test]
    fn test_search_reads_body() {
        let query = NoteQuery {
            search: Some("hidden".into()),
            ..NoteQuery::default()
        };
        let out = query.apply(sample(), &tags(), |n| {
            if n.id == "2" { "a hidden gem".into() } else { String::new() }
        });
        assert_eq!(ids(&out), vec!["2"]);
    }

    #[test]
    fn test_date_range_inclusive() {
        let query = NoteQuery::new()
            .with_dates(Some("2024-01-01"), Some("2024-01-01"))
            .unwrap();
        assert_eq!(ids(&query.apply(sample(), &tags(), |_| String::new())), vec!["1"]);
    }

    #[test]
    fn test_bad_date_is_bad_input() {
        let err = NoteQuery::new().with_dates(Some("2024-13-01"), None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::BadInput);
        assert!(NoteQuery::new()
            .with_dates(Some("2024-02-01"), Some("2024-01-01"))
            .is_err());
    }

    #[test]
    fn test_paginator() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(Paginator::new(2).unwrap().pages(&items).len(), 3);
        assert_eq!(Paginator::new(-1).unwrap().pages(&items), vec![&items[..]]);
        assert!(Paginator::new(3).unwrap().pages::<i32>(&[]).is_empty());
        assert!(Paginator::new(0).is_err());
    }
}
