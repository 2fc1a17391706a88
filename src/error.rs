//! Error types for the MongoDB access layer.
//!
//! This module defines the generic data-access error taxonomy using `thiserror`.
//! Driver-specific failures never cross this boundary: they are translated into
//! these variants before reaching callers, so the underlying driver can be
//! swapped without changing caller-facing error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("Connection failed: {message}")]
    Connectivity { message: String, suggestion: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout { operation: String, elapsed_secs: u64 },

    #[error("Permission denied: {operation} - {reason}")]
    PermissionDenied { operation: String, reason: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("No default database configured: {hint}")]
    NoDefaultDatabase { hint: String },

    #[error("Command failed: {message}")]
    Command {
        message: String,
        /// Server error code, e.g. 13 for Unauthorized
        code: Option<i32>,
        code_name: Option<String>,
        suggestion: String,
    },

    #[error("Write failed: {message}")]
    Write { message: String, code: Option<i32> },

    #[error("Duplicate key: {message}")]
    DuplicateKey { message: String },

    #[error("Codec error: {message}")]
    Codec { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Uncategorized driver error: {message}")]
    Uncategorized { message: String },
}

impl DataAccessError {
    /// Create a connectivity error with a helpful suggestion.
    pub fn connectivity(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create a permission error.
    pub fn permission_denied(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a no-default-database error.
    pub fn no_default_database(hint: impl Into<String>) -> Self {
        Self::NoDefaultDatabase { hint: hint.into() }
    }

    /// Create a command error with optional server code.
    pub fn command(
        message: impl Into<String>,
        code: Option<i32>,
        code_name: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Command {
            message: message.into(),
            code,
            code_name,
            suggestion: suggestion.into(),
        }
    }

    /// Create a write error.
    pub fn write(message: impl Into<String>, code: Option<i32>) -> Self {
        Self::Write {
            message: message.into(),
            code,
        }
    }

    /// Create a duplicate key error.
    pub fn duplicate_key(message: impl Into<String>) -> Self {
        Self::DuplicateKey {
            message: message.into(),
        }
    }

    /// Create a codec error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an uncategorized error.
    pub fn uncategorized(message: impl Into<String>) -> Self {
        Self::Uncategorized {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connectivity { suggestion, .. } => Some(suggestion),
            Self::Command { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity { .. } | Self::Timeout { .. })
    }
}

/// Result type alias for data-access operations.
pub type DataAccessResult<T> = Result<T, DataAccessError>;
