//! Error types for rollbook.
//!
//! This module defines all error types used throughout the rollbook crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rollbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// A record with this roll number is already stored.
    #[error("student with roll number '{roll_number}' already exists")]
    DuplicateKey {
        /// The conflicting roll number.
        roll_number: String,
    },

    /// No record with this roll number is stored.
    #[error("student with roll number '{roll_number}' not found")]
    NotFound {
        /// The roll number that was looked up.
        roll_number: String,
    },

    // === Storage Errors ===
    /// The data file exists but could not be read or parsed.
    #[error("failed to load records from {path}: {message}")]
    StorageLoad {
        /// Path to the data file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The data file could not be written after a mutation.
    #[error("failed to save records to {path}: {source}")]
    StorageWrite {
        /// Path to the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// A value supplied at the console boundary was rejected.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for rollbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a duplicate key error.
    #[must_use]
    pub fn duplicate_key(roll_number: impl Into<String>) -> Self {
        Self::DuplicateKey {
            roll_number: roll_number.into(),
        }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(roll_number: impl Into<String>) -> Self {
        Self::NotFound {
            roll_number: roll_number.into(),
        }
    }

    /// Create an input validation error.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Wrap a failure to persist the data file.
    #[must_use]
    pub fn storage_write(path: impl Into<PathBuf>, source: Error) -> Self {
        Self::StorageWrite {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Check if this error is a roll number conflict.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Check if this error means the roll number is not stored.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
