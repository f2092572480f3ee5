//! Errors raised by backing store implementations.

use uuid::Uuid;

/// Errors that can occur during store operations.
///
/// Absence on reads is not an error; `get` returns `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The record targeted by a write does not exist.
    #[error("Product not found: {id}")]
    NotFound {
        /// Identity of the missing record.
        id: Uuid,
    },

    /// A record with the same identity already exists.
    #[error("Product already exists: {id}")]
    AlreadyExists {
        /// Identity of the existing record.
        id: Uuid,
    },

    /// The caller cancelled before the store was touched.
    #[error("Operation cancelled")]
    Cancelled,

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(id: Uuid) -> Self {
        Self::AlreadyExists { id }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
