//! Error types for the code indexing and retrieval engine.
//!
//! Errors are split by concern, following the propagation policy: validation
//! errors are synchronous and never persisted, per-file problems are
//! recovered locally during a build, and whole-index integrity problems
//! (schema mismatch, disk failures on commit) are hard failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while building or querying the deep/shallow indexes.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No project path has been set; call set_project_path first")]
    NoProjectPath,

    #[error("Project path does not exist or is not a directory: {path}")]
    InvalidProjectPath { path: PathBuf },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors specific to the relational deep-index store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Index schema mismatch: found version {found}, expected {expected}. Discard the store file and rebuild.")]
    SchemaMismatch { found: u32, expected: u32 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to serialize value for storage: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error accessing store at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors surfaced synchronously to a caller; never persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Message(String),
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
