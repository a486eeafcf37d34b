//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found.
    #[error("document not found: {id}")]
    NotFound {
        /// The requested document id.
        id: String,
    },

    /// Write conflict: the supplied revision does not match the stored one.
    #[error("document update conflict: {id}")]
    Conflict {
        /// The conflicting document id.
        id: String,
    },

    /// An update was attempted without a document id.
    #[error("document id required for this operation")]
    MissingId,

    /// An update or delete was attempted without a revision.
    #[error("document revision required: {id}")]
    MissingRev {
        /// The document id lacking a revision.
        id: String,
    },

    /// An index over the same field set already exists.
    #[error("index already exists: {name}")]
    IndexExists {
        /// Name of the existing index.
        name: String,
    },

    /// The store has been destroyed; no further operations are possible.
    #[error("store has been destroyed")]
    Destroyed,

    /// Document payload could not be serialized or deserialized.
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Engine-specific failure (network, permission, corruption).
    #[error("store backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a conflict error.
    pub fn conflict(id: impl Into<String>) -> Self {
        Self::Conflict { id: id.into() }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns true for write conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Returns true when an index creation hit an already-existing index.
    ///
    /// Callers normalizing index creation treat this as success.
    pub fn is_index_exists(&self) -> bool {
        matches!(self, StoreError::IndexExists { .. })
    }
}
