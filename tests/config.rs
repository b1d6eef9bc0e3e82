//! # Init and Configuration Tests
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

mod common;

use std::fs;

use common::{ConfigBuilder, TestEnv};
use ztl::{commands, Config, Error, ErrorKind};

fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
    err.downcast_ref::<Error>().map(Error::kind)
}

#[test]
fn test_init_creates_config_directories_and_indexes() {
    let env = TestEnv::new();
    env.write_config(&ConfigBuilder::new());
    commands::init(true).expect("init should succeed");

    for dir in [
        env.notes_dir(),
        env.index_dir(),
        env.archive_dir(),
        env.trash_dir(),
        env.backup_dir(),
    ] {
        assert!(dir.is_dir(), "{} should exist", dir.display());
    }
    for file in [
        "notes.json",
        "tags.json",
        "note_tags.json",
        "links.json",
        "sources.json",
        "source_notes.json",
        "projects.json",
        "project_notes.json",
        "tasks.json",
    ] {
        assert!(env.read_json(file).is_empty(), "{file} should start empty");
    }
}

#[test]
fn test_config_load_reads_override_path() {
    let env = TestEnv::new();
    assert!(!env.config_path().exists());
    assert_eq!(Config::load().unwrap_err().kind(), ErrorKind::NotConfigured);

    let config = Config::default();
    assert_eq!(config.trash.retention, 14);
    assert_eq!(config.backup.retention, 30);

    let content = ConfigBuilder::new().build(&env);
    fs::write(env.config_path(), content).unwrap();
    let loaded = Config::load().unwrap();
    assert_eq!(loaded.zettel_dir, env.notes_dir().display().to_string().replace('\\', "/"));
}

#[test]
fn test_init_refuses_existing_config() {
    let env = TestEnv::new();
    env.write_config(&ConfigBuilder::new());
    let err = commands::init(false).unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::Conflict));
}

#[test]
fn test_init_force_keeps_existing_values() {
    let env = TestEnv::new();
    env.write_config(&ConfigBuilder::new().editor("nano").trash_retention(3));
    commands::init(true).unwrap();

    let config = Config::load().unwrap();
    assert_eq!(config.editor, "nano");
    assert_eq!(config.trash.retention, 3);
    assert_eq!(config.archive_dir, env.archive_dir().display().to_string().replace('\\', "/"));
}

#[test]
fn test_partial_config_uses_defaults() {
    let env = TestEnv::new();
    let notes = env.notes_dir().display().to_string().replace('\\', "/");
    fs::write(env.config_path(), format!("zettel_dir = \"{notes}\"\n")).unwrap();

    let config = Config::load().unwrap();
    assert_eq!(config.zettel_dir, notes);
    assert_eq!(config.editor, "vim");
    assert!(config.backup.enable);
    assert!(!config.sync.enable);
}

#[test]
fn test_invalid_config_is_not_configured() {
    let env = TestEnv::new();
    fs::write(env.config_path(), "zettel_dir = [").unwrap();
    let err = Config::load().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotConfigured);
}
