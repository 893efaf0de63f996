//! Centralized error handling for ncsubset
//!
//! Every failure of the list / extract / write pipeline is reported through
//! [`SubsetError`]. Nothing is retried internally.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ncsubset operations
pub type Result<T> = std::result::Result<T, SubsetError>;

/// Main error type for ncsubset operations
#[derive(Debug, Error)]
pub enum SubsetError {
    /// A file could not be opened or read
    #[error("Cannot access file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: IoFailure,
    },

    /// The file exists but is not a recognized hierarchical array file
    #[error("{} is not a readable hierarchical array file: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// A requested variable path is absent from the source file
    #[error("Variable '{path}' not found in source file")]
    VariableNotFound { path: String },

    /// Two outputs would overwrite each other in the same group
    #[error("Name '{name}' is used more than once in output group '{group}'")]
    NameCollision { name: String, group: String },

    /// Invalid compression settings or otherwise malformed request
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The destination could not be created or written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: IoFailure,
    },
}

/// Underlying cause of an access or write failure
#[derive(Debug, Error)]
pub enum IoFailure {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    #[error("{0}")]
    Other(String),
}

impl SubsetError {
    /// Create a FileAccess error.
    pub fn file_access(path: impl Into<PathBuf>, source: impl Into<IoFailure>) -> Self {
        Self::FileAccess {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a Format error.
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a VariableNotFound error.
    pub fn variable_not_found(path: impl Into<String>) -> Self {
        Self::VariableNotFound { path: path.into() }
    }

    /// Create a NameCollision error.
    pub fn name_collision(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self::NameCollision {
            name: name.into(),
            group: group.into(),
        }
    }

    /// Create a Configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a Write error.
    pub fn write(path: impl Into<PathBuf>, source: impl Into<IoFailure>) -> Self {
        Self::Write {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl From<String> for IoFailure {
    fn from(message: String) -> Self {
        IoFailure::Other(message)
    }
}

impl From<&str> for IoFailure {
    fn from(message: &str) -> Self {
        IoFailure::Other(message.to_string())
    }
}
