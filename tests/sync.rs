//! # Sync Tests
//!
//! Push, pull and status against a `local` bucket directory, with two
//! machines sharing one temp tree.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

mod common;

use std::{collections::BTreeSet, fs};

use common::{setup_with, write_config_for, ConfigBuilder, Machine, TestEnv};
use ztl::{
    commands::{self, sync::SyncAction, NewArgs},
    config::Config,
    note::NoteType,
    storage::Layout,
    sync::{LocalObjectStore, SyncEngine},
    Error, ErrorKind,
};

fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
    err.downcast_ref::<Error>().map(Error::kind)
}

fn synced_env() -> TestEnv {
    let env = TestEnv::new();
    let bucket = env.bucket_dir();
    env.write_config(&ConfigBuilder::new().sync_to(&bucket));
    commands::init(true).expect("init should succeed");
    env
}

fn engine_for(machine: &Machine, bucket: &std::path::Path) -> SyncEngine<LocalObjectStore> {
    let config = Config::load_from(&machine.config_path()).unwrap();
    SyncEngine::new(&Layout::from_config(&config), LocalObjectStore::new(bucket))
}

fn bucket_keys(bucket: &std::path::Path) -> BTreeSet<String> {
    walkdir::WalkDir::new(bucket)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(bucket)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

fn init_machine_b(env: &TestEnv) -> Machine {
    let b = env.second_machine();
    write_config_for(&b, &ConfigBuilder::new().sync_to(env.bucket_dir()));
    b.activate();
    commands::init(true).expect("init on machine b should succeed");
    env.machine.activate();
    b
}

#[test]
fn test_push_uploads_notes_indexes_and_manifests() {
    let env = synced_env();
    commands::new(
        NoteType::Permanent,
        NewArgs {
            title: "Spaced repetition".to_string(),
            tags: vec!["memory".to_string(), "learning".to_string()],
            book: None,
        },
    )
    .unwrap();

    commands::sync::execute(SyncAction::Push).expect("push should succeed");

    let keys = bucket_keys(&env.bucket_dir());
    let id = env.note_id("n001");
    assert!(keys.contains(&format!("notes/{id}.md")));
    assert!(keys.contains("json/notes.json"));
    assert!(keys.contains("json/tags.json"));
    assert!(keys.contains("json/note_tags.json"));
    assert!(keys.contains("notes/metadata_notes.json"));
    assert!(keys.contains("json/metadata_json.json"));
    assert_eq!(keys.iter().filter(|k| k.ends_with(".md")).count(), 1);

    // the second machine sees exactly what was pushed
    let b = init_machine_b(&env);
    let status = engine_for(&b, &env.bucket_dir()).status().unwrap();
    let expected: BTreeSet<String> = keys
        .iter()
        .filter(|k| !k.ends_with("metadata_notes.json") && !k.ends_with("metadata_json.json"))
        .cloned()
        .collect();
    let to_pull: BTreeSet<String> = status.to_pull.into_iter().collect();
    assert_eq!(to_pull, expected);
}

#[test]
fn test_pull_converges_and_is_idempotent() {
    let env = synced_env();
    commands::new(
        NoteType::Fleeting,
        NewArgs {
            title: "Captured".to_string(),
            ..NewArgs::default()
        },
    )
    .unwrap();
    commands::sync::execute(SyncAction::Push).unwrap();

    let b = init_machine_b(&env);
    let engine = engine_for(&b, &env.bucket_dir());
    let first = engine.pull().unwrap();
    assert!(!first.files.is_empty());

    let a_notes = env.md_files(&env.notes_dir());
    assert_eq!(b.md_files(&b.notes_dir()), a_notes);
    let name = &a_notes[0];
    assert_eq!(
        fs::read(env.notes_dir().join(name)).unwrap(),
        fs::read(b.notes_dir().join(name)).unwrap()
    );
    assert_eq!(
        fs::read(env.index_dir().join("notes.json")).unwrap(),
        fs::read(b.index_dir().join("notes.json")).unwrap()
    );

    let second = engine.pull().unwrap();
    assert!(second.files.is_empty());
}

#[test]
fn test_second_push_only_sends_changes() {
    let env = synced_env();
    commands::sync::execute(SyncAction::Push).unwrap();
    let engine = engine_for(&env.machine, &env.bucket_dir());
    assert!(engine.push().unwrap().files.is_empty());
}

#[test]
fn test_corrupt_remote_manifest_refuses_pull() {
    let env = synced_env();
    commands::sync::execute(SyncAction::Push).unwrap();
    fs::write(env.bucket_dir().join("json/metadata_json.json"), "{not json").unwrap();

    let err = commands::sync::execute(SyncAction::Pull).unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::Remote));

    // push regenerates it
    commands::sync::execute(SyncAction::Push).expect("push should regenerate the manifest");
    commands::sync::execute(SyncAction::Pull).expect("pull should succeed afterwards");
}

#[test]
fn test_sync_disabled_is_not_configured() {
    let _env = setup_with(&ConfigBuilder::new());
    let err = commands::sync::execute(SyncAction::Status).unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::NotConfigured));
}

#[test]
fn test_s3_platform_is_remote_unavailable() {
    let env = TestEnv::new();
    env.write_config(
        &ConfigBuilder::new()
            .sync_to("my-bucket")
            .sync_platform("s3"),
    );
    commands::init(true).unwrap();
    let err = commands::sync::execute(SyncAction::Push).unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::Remote));
}

#[test]
fn test_missing_bucket_dir_is_remote_unavailable() {
    let env = TestEnv::new();
    env.write_config(&ConfigBuilder::new().sync_to(env.dir.path().join("nowhere")));
    commands::init(true).unwrap();
    let err = commands::sync::execute(SyncAction::Status).unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::Remote));
}
