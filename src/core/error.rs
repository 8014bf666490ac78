//! Error types and error handling for doctree.
//!
//! Every fallible operation in the core returns [`DoctreeError`].
//! Callers that need to react to a failure class (not found,
//! cancellation, incompatible record) use [`DoctreeError::kind`]
//! or one of the `is_*` predicates rather than matching variants.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for doctree operations
pub type Result<T> = std::result::Result<T, DoctreeError>;

/// Coarse failure classes exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Filesystem or storage-medium failure
    Io,
    /// An extractor could not parse a source file
    Parse,
    /// The requested (project, language) key is absent
    NotFound,
    /// Stored record uses a schema version this build cannot read
    IncompatibleSchema,
    /// Caller-requested abort
    Cancelled,
    /// Malformed caller input (names, queries, paths)
    InvalidInput,
    /// Configuration could not be loaded or validated
    Config,
    /// A worker task panicked or failed outside any caller input
    Internal,
}

/// Main error type for doctree
#[derive(Error, Debug)]
pub enum DoctreeError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record at {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Index not found: project '{project}', language '{language}'")]
    IndexNotFound { project: String, language: String },

    #[error(
        "Incompatible schema version {found} for project '{project}', language '{language}' \
         (supported: {supported})"
    )]
    IncompatibleSchema {
        project: String,
        language: String,
        found: u32,
        supported: u32,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Extractor already registered for language '{0}'")]
    DuplicateExtractor(String),

    #[error("Invalid project name: {0}")]
    InvalidProjectName(String),

    #[error("Invalid language tag: {0}")]
    InvalidLanguage(String),

    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for DoctreeError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            DoctreeError::Cancelled
        } else {
            DoctreeError::TaskFailed(err.to_string())
        }
    }
}

impl DoctreeError {
    /// Build an I/O error carrying the offending path
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        DoctreeError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a parse error carrying the offending path
    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        DoctreeError::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DoctreeError::Io { .. } | DoctreeError::Serialization { .. } => ErrorKind::Io,
            DoctreeError::Parse { .. } => ErrorKind::Parse,
            DoctreeError::IndexNotFound { .. } => ErrorKind::NotFound,
            DoctreeError::IncompatibleSchema { .. } => ErrorKind::IncompatibleSchema,
            DoctreeError::Cancelled => ErrorKind::Cancelled,
            DoctreeError::DuplicateExtractor(_)
            | DoctreeError::InvalidProjectName(_)
            | DoctreeError::InvalidLanguage(_)
            | DoctreeError::InvalidIndex(_)
            | DoctreeError::InvalidQuery(_)
            | DoctreeError::InvalidPath(_) => ErrorKind::InvalidInput,
            DoctreeError::ConfigError(_) | DoctreeError::TomlError(_) => ErrorKind::Config,
            DoctreeError::TaskFailed(_) => ErrorKind::Internal,
        }
    }

    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if the operation was cancelled by the caller
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Check if a stored record was written by a newer or retired schema
    pub fn is_incompatible_schema(&self) -> bool {
        self.kind() == ErrorKind::IncompatibleSchema
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidInput | ErrorKind::Config)
    }
}
