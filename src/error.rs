//! Error types for contactmerge.
//!
//! Only setup failures surface as `Err`. Per-record validation and
//! persistence failures are collected in the import report instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::merge::MergeError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("vCard parse error on line {line}: {message}")]
    VCard { line: usize, message: String },

    #[error("Invalid backup file: {0}")]
    Backup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store {op} failed: {message}")]
    Store { op: &'static str, message: String },

    #[error("Could not list folders: {0}")]
    FolderListing(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Merge answer rejected: {0}")]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn store(op: &'static str, message: impl Into<String>) -> Self {
        Self::Store {
            op,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
