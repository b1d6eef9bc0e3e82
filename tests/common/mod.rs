//! # Test Harness
//!
//! Utilities for integration testing ztl without touching the user's
//! configuration. The config path is redirected through a thread-local
//! override, and every directory lives in a temporary tree.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, SystemTime},
};

use serde_json::Value;
use tempfile::TempDir;

use ztl::{note::Document, set_config_override};

/// Global lock so tests touching the override and shared temp state run one at a time.
static TEST_LOCK: Mutex<()> = Mutex::new(());

/// One "machine": a config file plus its note, archive, trash, backup and
/// index directories under a common root.
#[derive(Debug, Clone)]
pub struct Machine {
    pub root: PathBuf,
}

impl Machine {
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.root.join("zettelkasten")
    }

    pub fn index_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.join("archive")
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.root.join("trash")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root.join("backup")
    }

    /// Parses an index collection, e.g. `notes.json`.
    pub fn read_json(&self, file: &str) -> Vec<Value> {
        let content = fs::read_to_string(self.index_dir().join(file))
            .unwrap_or_else(|e| panic!("Failed to read {file}: {e}"));
        serde_json::from_str(&content).unwrap_or_else(|e| panic!("Invalid JSON in {file}: {e}"))
    }

    /// The notes.json row with the given seq id.
    pub fn note_row(&self, seq_id: &str) -> Value {
        self.read_json("notes.json")
            .into_iter()
            .find(|row| row["seq_id"] == seq_id)
            .unwrap_or_else(|| panic!("no notes.json row for {seq_id}"))
    }

    /// The file id (`YYYYMMDDhhmmss`) of a note.
    pub fn note_id(&self, seq_id: &str) -> String {
        self.note_row(seq_id)["id"]
            .as_str()
            .expect("id should be a string")
            .to_string()
    }

    pub fn note_path_in(&self, dir: &Path, seq_id: &str) -> PathBuf {
        dir.join(format!("{}.md", self.note_id(seq_id)))
    }

    pub fn live_note_path(&self, seq_id: &str) -> PathBuf {
        self.note_path_in(&self.notes_dir(), seq_id)
    }

    pub fn load_note(&self, path: &Path) -> Document {
        Document::load(path).unwrap_or_else(|e| panic!("Failed to load {}: {e}", path.display()))
    }

    /// Markdown files (by name) directly inside `dir`.
    pub fn md_files(&self, dir: &Path) -> Vec<String> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".md"))
            .collect();
        names.sort();
        names
    }

    /// Appends text to a note body on disk, as an editor would.
    pub fn append_to_note(&self, path: &Path, text: &str) {
        let mut content = fs::read_to_string(path).expect("Failed to read note");
        content.push_str(text);
        fs::write(path, content).expect("Failed to write note");
    }

    /// Makes the config of this machine the active one.
    pub fn activate(&self) {
        set_config_override(Some(self.config_path()));
    }
}

/// Test environment owning the temp tree and the global test lock.
pub struct TestEnv {
    pub dir: TempDir,
    pub machine: Machine,
    #[allow(dead_code)]
    test_guard: std::sync::MutexGuard<'static, ()>,
}

impl TestEnv {
    /// Creates an environment with the config override pointing at a
    /// not-yet-written config file.
    pub fn new() -> Self {
        // Recover from poisoned mutex (if a previous test panicked while holding the lock)
        let test_guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().expect("Failed to create temp dir");
        let machine = Machine {
            root: dir.path().join("machine-a"),
        };
        fs::create_dir_all(&machine.root).expect("Failed to create machine dir");
        machine.activate();
        Self {
            dir,
            machine,
            test_guard,
        }
    }

    /// Adds another machine sharing the same temp tree; not activated.
    pub fn second_machine(&self) -> Machine {
        let machine = Machine {
            root: self.dir.path().join("machine-b"),
        };
        fs::create_dir_all(&machine.root).expect("Failed to create machine dir");
        machine
    }

    /// A directory acting as the `local` sync bucket.
    pub fn bucket_dir(&self) -> PathBuf {
        let path = self.dir.path().join("bucket");
        fs::create_dir_all(&path).expect("Failed to create bucket dir");
        path
    }

    /// Writes `builder` as the active machine's config.
    pub fn write_config(&self, builder: &ConfigBuilder) {
        write_config_for(&self.machine, builder);
    }
}

impl std::ops::Deref for TestEnv {
    type Target = Machine;

    fn deref(&self) -> &Machine {
        &self.machine
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        set_config_override(None);
    }
}

pub fn write_config_for(machine: &Machine, builder: &ConfigBuilder) {
    fs::write(machine.config_path(), builder.build(machine)).expect("Failed to write config");
}

// =============================================================================
// Test Setup Helpers
// =============================================================================

/// Environment with a default config written and `init --force` run on it.
pub fn setup_test_env() -> TestEnv {
    setup_with(&ConfigBuilder::new())
}

pub fn setup_with(builder: &ConfigBuilder) -> TestEnv {
    let env = TestEnv::new();
    env.write_config(builder);
    ztl::commands::init(true).expect("init should succeed");
    env
}

/// Sets a file's modification time `days` in the past.
pub fn age_file(path: &Path, days: u64) {
    let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    fs::File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(when))
        .expect("Failed to set modification time");
}

// =============================================================================
// Config Builder
// =============================================================================

/// Builder for test configurations. Directories always point into the
/// machine's temp root; only behavior is configurable.
pub struct ConfigBuilder {
    editor: String,
    backup_enable: bool,
    backup_retention: u32,
    trash_retention: u32,
    sync_bucket: Option<PathBuf>,
    sync_platform: &'static str,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            editor: "true".to_string(), // no-op editor
            backup_enable: true,
            backup_retention: 30,
            trash_retention: 14,
            sync_bucket: None,
            sync_platform: "local",
        }
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    pub fn backups(mut self, enable: bool) -> Self {
        self.backup_enable = enable;
        self
    }

    pub fn backup_retention(mut self, days: u32) -> Self {
        self.backup_retention = days;
        self
    }

    pub fn trash_retention(mut self, days: u32) -> Self {
        self.trash_retention = days;
        self
    }

    pub fn sync_to(mut self, bucket: impl Into<PathBuf>) -> Self {
        self.sync_bucket = Some(bucket.into());
        self
    }

    pub fn sync_platform(mut self, platform: &'static str) -> Self {
        self.sync_platform = platform;
        self
    }

    pub fn build(&self, machine: &Machine) -> String {
        let path = |p: PathBuf| p.display().to_string().replace('\\', "/");
        let bucket = self.sync_bucket.clone().map(path).unwrap_or_default();
        format!(
            r#"zettel_dir = "{notes}"
editor = "{editor}"
json_data_dir = "{index}"
archive_dir = "{archive}"

[backup]
enable = {backup_enable}
retention = {backup_retention}
backup_dir = "{backup}"

[trash]
retention = {trash_retention}
trash_dir = "{trash}"

[sync]
enable = {sync_enable}
platform = "{platform}"
bucket = "{bucket}"
"#,
            notes = path(machine.notes_dir()),
            editor = self.editor,
            index = path(machine.index_dir()),
            archive = path(machine.archive_dir()),
            backup_enable = self.backup_enable,
            backup_retention = self.backup_retention,
            backup = path(machine.backup_dir()),
            trash_retention = self.trash_retention,
            trash = path(machine.trash_dir()),
            sync_enable = self.sync_bucket.is_some(),
            platform = self.sync_platform,
        )
    }
}
