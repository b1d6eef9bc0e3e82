//! # Link Graph Tests
//!
//! Link derivation from note bodies and headers.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

mod common;

use std::fs;

use common::setup_test_env;
use proptest::prelude::*;
use tempfile::TempDir;
use ztl::{
    commands::{self, link::LinkListArgs, NewArgs},
    index::{IndexStore, Link},
    lifecycle::{Engine, NewNote},
    links,
    note::NoteType,
    storage::Layout,
};

fn list_args() -> LinkListArgs {
    LinkListArgs {
        tag: None,
        query: None,
        only_linked: false,
        limit: -1,
    }
}

fn new_permanent(title: &str) {
    commands::new(
        NoteType::Permanent,
        NewArgs {
            title: title.to_string(),
            ..NewArgs::default()
        },
    )
    .expect("new should succeed");
}

#[test]
fn test_link_to_existing_file_becomes_edge() {
    let env = setup_test_env();
    new_permanent("Spaced repetition");
    let source = env.note_id("n001");

    fs::write(env.notes_dir().join("20240101120000.md"), "# Older note\n").unwrap();
    env.append_to_note(
        &env.live_note_path("n001"),
        "\nSee [other](20240101120000.md)\n",
    );

    commands::link::execute_list(&list_args()).expect("link list should succeed");

    let edges = env.read_json("links.json");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["source_note_id"], source.as_str());
    assert_eq!(edges[0]["target_note_id"], "20240101120000");
}

#[test]
fn test_link_to_missing_file_is_dropped() {
    let env = setup_test_env();
    new_permanent("Spaced repetition");
    env.append_to_note(
        &env.live_note_path("n001"),
        "\nSee [other](20240101120000.md)\n",
    );

    commands::link::execute_list(&list_args()).expect("link list should succeed");
    assert!(env.read_json("links.json").is_empty());
}

#[test]
fn test_link_to_trashed_note_is_dropped() {
    let env = setup_test_env();
    new_permanent("Source");
    new_permanent("Target");
    let target = env.note_id("n002");
    env.append_to_note(&env.live_note_path("n001"), &format!("\n[t]({target}.md)\n"));

    commands::link::execute_rebuild().expect("rebuild should succeed");
    assert_eq!(env.read_json("links.json").len(), 1);

    commands::remove(NoteType::Permanent, "n002", false).unwrap();
    commands::link::execute_rebuild().expect("rebuild should succeed");
    assert!(env.read_json("links.json").is_empty());
}

#[test]
fn test_archived_notes_keep_their_links() {
    let env = setup_test_env();
    new_permanent("Source");
    new_permanent("Target");
    let target = env.note_id("n002");
    env.append_to_note(&env.live_note_path("n001"), &format!("\n[t]({target}.md)\n"));

    commands::archive(NoteType::Permanent, "n001").unwrap();
    commands::link::execute_rebuild().expect("rebuild should succeed");

    let edges = env.read_json("links.json");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["target_note_id"], target.as_str());
}

#[test]
fn test_link_list_filters_run() {
    let env = setup_test_env();
    new_permanent("Alpha");
    new_permanent("Beta");
    let target = env.note_id("n002");
    env.append_to_note(&env.live_note_path("n001"), &format!("\n[b]({target}.md)\n"));

    commands::link::execute_list(&LinkListArgs {
        tag: Some("none".to_string()),
        query: Some("beta".to_string()),
        only_linked: true,
        limit: 10,
    })
    .expect("filtered link list should succeed");
}

// =============================================================================
// Rebuild idempotence
// =============================================================================

fn engine_in(tmp: &TempDir) -> Engine {
    let root = tmp.path();
    let layout = Layout {
        notes_dir: root.join("zk"),
        archive_dir: root.join("archive"),
        trash_dir: root.join("trash"),
        backup_dir: root.join("backup"),
        index_dir: root.join("data"),
    };
    layout.ensure().unwrap();
    let index = IndexStore::open(&layout.index_dir).unwrap();
    Engine::new(layout, index).with_backups(false)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_rebuild_twice_is_identical(
        edges in prop::collection::vec((0usize..5, 0usize..7), 0..12),
    ) {
        let tmp = TempDir::new().unwrap();
        let engine = engine_in(&tmp);

        let mut ids = Vec::new();
        for i in 0..5 {
            let note = engine
                .create(NewNote::new(NoteType::Permanent, format!("Note {i}")))
                .unwrap();
            ids.push(note.id);
        }

        // indices 5 and 6 point at ids that have no file
        let target_of = |t: usize| {
            ids.get(t)
                .cloned()
                .unwrap_or_else(|| format!("1999010100000{t}"))
        };
        for (from, to) in &edges {
            let path = engine.layout().notes_dir.join(format!("{}.md", ids[*from]));
            let mut content = fs::read_to_string(&path).unwrap();
            content.push_str(&format!("\n[x]({}.md)\n", target_of(*to)));
            fs::write(&path, content).unwrap();
        }

        links::rebuild(engine.layout(), engine.index()).unwrap();
        let first: Vec<Link> = engine.index().load().unwrap();
        let first_bytes = fs::read(engine.index().path::<Link>()).unwrap();

        links::rebuild(engine.layout(), engine.index()).unwrap();
        let second: Vec<Link> = engine.index().load().unwrap();
        let second_bytes = fs::read(engine.index().path::<Link>()).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first_bytes, second_bytes);
        prop_assert!(first.iter().all(|l| l.source_note_id != l.target_note_id));
        prop_assert!(first.iter().all(|l| ids.contains(&l.target_note_id)));
    }
}
