//! # Configuration
//!
//! The user configuration document: where notes, indexes, archive, trash and
//! backups live, which editor to launch, retention horizons, and remote sync
//! options. Stored as TOML at a location resolved by [`Config::path`].
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{CONFIG_DIR, CONFIG_ENV_VAR, CONFIG_FILENAME},
    error::{Error, Result},
    storage,
};

thread_local! {
    /// Thread-local override for the configuration file path.
    /// Used by integration tests to redirect config to a temp directory
    /// without modifying environment variables.
    static CONFIG_OVERRIDE: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
}

/// Sets a thread-local override for the configuration file path.
pub fn set_config_override(path: Option<PathBuf>) {
    CONFIG_OVERRIDE.with(|cell| {
        *cell.borrow_mut() = path;
    });
}

fn get_config_override() -> Option<PathBuf> {
    CONFIG_OVERRIDE.with(|cell| cell.borrow().clone())
}

/// Remote platform used by `ztl sync`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPlatform {
    /// A directory (mounted bucket, network share) acting as the object store.
    #[default]
    Local,
    /// Amazon S3. Recognized, but no client is compiled into this build.
    S3,
}

impl SyncPlatform {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::S3 => "s3",
        }
    }
}

impl std::str::FromStr for SyncPlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => Err(Error::BadInput(format!(
                "unknown sync platform '{other}' (expected local or s3)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Copy a note into the backup directory before each edit
    pub enable: bool,
    /// Days to keep backups (0 disables the sweep)
    pub retention: u32,
    pub backup_dir: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enable: true,
            retention: 30,
            backup_dir: "~/.config/ztl/backup".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrashConfig {
    /// Days a trashed note survives before it is purged (0 disables the sweep)
    pub retention: u32,
    pub trash_dir: String,
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            retention: 14,
            trash_dir: "~/.config/ztl/trash".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enable: bool,
    pub platform: SyncPlatform,
    /// Bucket name, or the root directory for the `local` platform
    pub bucket: String,
    pub aws_profile: String,
    pub aws_region: String,
}

/// User configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Working directory holding live notes
    pub zettel_dir: String,
    /// Editor command (e.g., "nvim", "code --wait")
    pub editor: String,
    /// Directory holding the JSON indexes and sync manifests
    pub json_data_dir: String,
    pub archive_dir: String,
    pub backup: BackupConfig,
    pub trash: TrashConfig,
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zettel_dir: "~/Zettelkasten".to_string(),
            editor: "vim".to_string(),
            json_data_dir: "~/.config/ztl/data".to_string(),
            archive_dir: "~/.config/ztl/archive".to_string(),
            backup: BackupConfig::default(),
            trash: TrashConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Returns the path of the configuration file.
    ///
    /// Precedence: thread-local override (tests), `$ZTL_CONFIG`, the OS
    /// configuration directory, then `~/.config/ztl/config.toml`.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = get_config_override() {
            return Ok(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(dir) = dirs::config_dir() {
            return Ok(dir.join(CONFIG_DIR).join(CONFIG_FILENAME));
        }
        dirs::home_dir()
            .map(|home| home.join(".config").join(CONFIG_DIR).join(CONFIG_FILENAME))
            .ok_or_else(|| Error::NotConfigured {
                path: PathBuf::from(CONFIG_FILENAME),
                reason: "could not determine home directory".to_string(),
            })
    }

    pub fn exists() -> bool {
        Self::path().is_ok_and(|p| p.is_file())
    }

    /// Loads the configuration. Fails if it doesn't exist; run `ztl init` first.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotConfigured {
                path: path.to_path_buf(),
                reason: "file not found, run `ztl init` first".to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| Error::NotConfigured {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| Error::NotConfigured {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })
    }

    /// Saves the configuration atomically to [`Config::path`].
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let body = toml::to_string_pretty(self)
            .map_err(|e| Error::BadInput(format!("cannot serialize configuration: {e}")))?;
        let content = format!(
            "# ztl configuration\n\
             # Paths may start with ~/ to refer to the home directory.\n\
             # Retention values are in days; 0 disables the sweep.\n\n{body}"
        );
        storage::write_atomic(path, content.as_bytes())
    }

    pub fn zettel_path(&self) -> PathBuf {
        expand_home(&self.zettel_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        expand_home(&self.json_data_dir)
    }

    pub fn archive_path(&self) -> PathBuf {
        expand_home(&self.archive_dir)
    }

    pub fn trash_path(&self) -> PathBuf {
        expand_home(&self.trash.trash_dir)
    }

    pub fn backup_path(&self) -> PathBuf {
        expand_home(&self.backup.backup_dir)
    }

    /// Returns the effective editor command.
    ///
    /// Falls back to `$VISUAL`, then `$EDITOR`, then `vi`.
    pub fn editor_command(&self) -> String {
        let configured = self.editor.trim();
        if !configured.is_empty() {
            return configured.to_string();
        }
        std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string())
    }
}

/// Expands a leading `~` or `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = || dirs::home_dir().unwrap_or_default();
    if path == "~" {
        home()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home().join(rest)
    } else {
        PathBuf::from(path)
    }
}
