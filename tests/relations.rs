//! # Source and Project Tests
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

mod common;

use common::setup_test_env;
use ztl::{
    commands::{self, source::SourceArgs, NewArgs},
    index::SourceType,
    lifecycle::SourcePatch,
    note::NoteType,
    Error, ErrorKind,
};

fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
    err.downcast_ref::<Error>().map(Error::kind)
}

fn new_book(title: &str) {
    commands::source::execute_new(SourceArgs {
        source_type: SourceType::Book,
        title: title.to_string(),
        author: Some("Sönke Ahrens".to_string()),
        publisher: None,
        year: Some(2017),
        isbn: None,
        url: None,
    })
    .expect("source new should succeed");
}

fn new_note(note_type: NoteType, title: &str, book: Option<&str>) {
    commands::new(
        note_type,
        NewArgs {
            title: title.to_string(),
            tags: Vec::new(),
            book: book.map(ToString::to_string),
        },
    )
    .expect("new should succeed");
}

// =============================================================================
// Sources
// =============================================================================

#[test]
fn test_source_new_allocates_id() {
    let env = setup_test_env();
    new_book("How to Take Smart Notes");

    let sources = env.read_json("sources.json");
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["source_id"], "s001");
    assert_eq!(sources[0]["source_type"], "book");
    assert_eq!(sources[0]["year"], 2017);
}

#[test]
fn test_duplicate_source_is_conflict() {
    let _env = setup_test_env();
    new_book("How to Take Smart Notes");
    let err = commands::source::execute_new(SourceArgs {
        source_type: SourceType::Book,
        title: "how to take smart notes".to_string(),
        author: None,
        publisher: None,
        year: None,
        isbn: None,
        url: None,
    })
    .unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::Conflict));
}

#[test]
fn test_index_note_with_book_links_source() {
    let env = setup_test_env();
    new_book("How to Take Smart Notes");
    new_note(NoteType::Index, "Note-taking", Some("s001"));

    let edges = env.read_json("source_notes.json");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["source_id"], "s001");
    assert_eq!(edges[0]["note_id"], env.note_id("n001").as_str());

    commands::source::execute_show("s001").expect("source show should succeed");
}

#[test]
fn test_source_add_and_remove_note() {
    let env = setup_test_env();
    new_book("How to Take Smart Notes");
    new_note(NoteType::Literature, "Chapter 1", None);

    commands::source::execute_add_note("n001", "s001").expect("add-note should succeed");
    assert_eq!(env.read_json("source_notes.json").len(), 1);

    let err = commands::source::execute_add_note("n001", "s001").unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::Conflict));

    commands::source::execute_remove_note("n001", "s001").expect("remove-note should succeed");
    assert!(env.read_json("source_notes.json").is_empty());

    let err = commands::source::execute_remove_note("n001", "s001").unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::NotFound));
}

#[test]
fn test_source_edit_updates_only_given_fields() {
    let env = setup_test_env();
    new_book("How to Take Smart Notes");

    commands::source::execute_edit(
        "s001",
        SourcePatch {
            publisher: Some("CreateSpace".to_string()),
            ..SourcePatch::default()
        },
    )
    .expect("source edit should succeed");

    let source = &env.read_json("sources.json")[0];
    assert_eq!(source["publisher"], "CreateSpace");
    assert_eq!(source["author"], "Sönke Ahrens");
    assert_eq!(source["title"], "How to Take Smart Notes");

    let err = commands::source::execute_edit("s001", SourcePatch::default()).unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::BadInput));

    let err = commands::source::execute_edit(
        "s404",
        SourcePatch {
            url: Some("https://example.org".to_string()),
            ..SourcePatch::default()
        },
    )
    .unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::NotFound));
}

#[test]
fn test_source_list_runs() {
    let _env = setup_test_env();
    new_book("How to Take Smart Notes");
    commands::source::execute_list(-1).expect("source list should succeed");
}

#[test]
fn test_purge_drops_source_edges() {
    let env = setup_test_env();
    new_book("How to Take Smart Notes");
    new_note(NoteType::Index, "Note-taking", Some("s001"));

    commands::remove(NoteType::Index, "n001", true).expect("purge should succeed");
    assert!(env.read_json("source_notes.json").is_empty());
    assert_eq!(env.read_json("sources.json").len(), 1);
}

// =============================================================================
// Projects
// =============================================================================

#[test]
fn test_project_add_sets_header_and_edge() {
    let env = setup_test_env();
    commands::project::execute_new("Thesis").expect("project new should succeed");
    new_note(NoteType::Permanent, "Claim", None);

    commands::project::execute_add("n001", "p001").expect("project add should succeed");

    let edges = env.read_json("project_notes.json");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["project_id"], "p001");
    assert_eq!(env.note_row("n001")["project_name"], "Thesis");

    let doc = env.load_note(&env.live_note_path("n001"));
    assert_eq!(doc.header.common().project_name.as_deref(), Some("Thesis"));

    commands::project::execute_list().expect("project list should succeed");
    commands::project::execute_show("p001").expect("project show should succeed");
}

#[test]
fn test_duplicate_project_is_conflict() {
    let env = setup_test_env();
    commands::project::execute_new("Thesis").unwrap();
    let err = commands::project::execute_new("thesis").unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::Conflict));
    assert_eq!(env.read_json("projects.json").len(), 1);
}

#[test]
fn test_project_unknown_is_not_found() {
    let _env = setup_test_env();
    new_note(NoteType::Permanent, "Claim", None);
    let err = commands::project::execute_add("n001", "p009").unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::NotFound));
    let err = commands::project::execute_show("p009").unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::NotFound));
}
