//! # Errors
//!
//! Error taxonomy shared by the library. Commands wrap these in `anyhow`
//! with additional context; tests match on [`Error::kind`].
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::{io, path::PathBuf};

use thiserror::Error as ThisError;

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error classification used for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotConfigured,
    NotFound,
    Conflict,
    BadInput,
    FrontMatter,
    CorruptIndex,
    Io,
    Remote,
}

/// Library error.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration is absent or unreadable.
    #[error("configuration not usable at {}: {reason}", path.display())]
    NotConfigured { path: PathBuf, reason: String },

    /// Lookup by seq id or id failed.
    #[error("{0} not found")]
    NotFound(String),

    /// Refused because of a lock file, a duplicate key or exclusive flags.
    #[error("{0}")]
    Conflict(String),

    /// Malformed user input.
    #[error("{0}")]
    BadInput(String),

    /// The document does not start with a `---` fence.
    #[error("no YAML front matter found")]
    NoFrontMatter,

    /// The fenced header is not valid for the expected header type.
    #[error("invalid front matter: {0}")]
    InvalidFrontMatter(String),

    /// An index file could not be decoded.
    #[error("corrupt index file {}", path.display())]
    CorruptIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure.
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Remote synchronization failure.
    #[error(transparent)]
    Remote(#[from] SyncError),
}

impl Error {
    /// Wraps an I/O error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured { .. } => ErrorKind::NotConfigured,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::BadInput(_) => ErrorKind::BadInput,
            Self::NoFrontMatter | Self::InvalidFrontMatter(_) => ErrorKind::FrontMatter,
            Self::CorruptIndex { .. } => ErrorKind::CorruptIndex,
            Self::Io { .. } => ErrorKind::Io,
            Self::Remote(_) => ErrorKind::Remote,
        }
    }
}

/// Failures raised by the sync engine and object stores.
#[derive(Debug, ThisError)]
pub enum SyncError {
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("access denied by remote store: {0}")]
    AuthDenied(String),

    #[error("remote object not found: {0}")]
    ObjectNotFound(String),

    #[error("local I/O error at {}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("manifest {key} is corrupt")]
    ManifestCorrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    pub fn local_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }
}
