//! Error types for the task board

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur while editing or persisting the board
#[derive(Debug, Error)]
pub enum BoardError {
    /// A required field is missing or a value does not parse
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// No task with this id
    #[error("task not found: {id}")]
    NotFound { id: Uuid },

    /// The storage file could not be read or written
    #[error("cannot access {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage file is readable but not valid task CSV
    #[error("malformed task file {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Two rows in the storage file share an id
    #[error("duplicate task id in storage: {id}")]
    DuplicateId { id: Uuid },
}

impl BoardError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from the storage file rather than user input
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Csv { .. } | Self::DuplicateId { .. }
        )
    }
}
