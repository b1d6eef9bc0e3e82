//! # Constants
//!
//! Centralized constants for magic values used throughout ztl.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

// =============================================================================
// UI Display
// =============================================================================

/// Maximum length for title display in lists (truncated with ellipsis).
pub const UI_TITLE_TRUNCATE_LEN: usize = 40;

/// Maximum length for tag display in lists (truncated with ellipsis).
pub const UI_TAGS_TRUNCATE_LEN: usize = 24;

/// Default page size for list commands.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

// =============================================================================
// Note Format
// =============================================================================

/// YAML frontmatter delimiter.
pub const FRONTMATTER_DELIMITER: &str = "---";

/// File extension for note files.
pub const NOTE_FILE_EXTENSION: &str = "md";

/// File extension for editor lock files.
pub const LOCK_FILE_EXTENSION: &str = "lock";

/// Timestamp format of note ids (`YYYYMMDDhhmmss`).
pub const NOTE_ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Timestamp format of `created_at`/`updated_at` in headers and rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format accepted by `--from`/`--to`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Suffix format of backup copies (`<id>_<suffix>.md`).
pub const BACKUP_SUFFIX_FORMAT: &str = "%Y%m%dT%H%M%S";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration directory name (inside the user's config directory).
pub const CONFIG_DIR: &str = "ztl";

/// Configuration file name (inside `CONFIG_DIR`).
pub const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable that overrides the configuration path.
pub const CONFIG_ENV_VAR: &str = "ZTL_CONFIG";

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "ZTL_LOG";

// =============================================================================
// Index Files
// =============================================================================

pub const NOTES_FILE: &str = "notes.json";
pub const TAGS_FILE: &str = "tags.json";
pub const NOTE_TAGS_FILE: &str = "note_tags.json";
pub const LINKS_FILE: &str = "links.json";
pub const SOURCES_FILE: &str = "sources.json";
pub const SOURCE_NOTES_FILE: &str = "source_notes.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const PROJECT_NOTES_FILE: &str = "project_notes.json";
pub const TASKS_FILE: &str = "tasks.json";

// =============================================================================
// Sync
// =============================================================================

/// Manifest of the working directory.
pub const NOTES_MANIFEST: &str = "metadata_notes.json";

/// Manifest of the index directory.
pub const JSON_MANIFEST: &str = "metadata_json.json";

/// Remote prefix mirroring the working directory.
pub const NOTES_PREFIX: &str = "notes";

/// Remote prefix mirroring the index directory.
pub const JSON_PREFIX: &str = "json";

/// Timestamp differences at or below this many seconds are treated as equal.
pub const SYNC_GRACE_SECONDS: i64 = 1;
