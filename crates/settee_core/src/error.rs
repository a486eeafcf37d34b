//! Error types for Settee core.

use settee_replication::ReplicationError;
use settee_store::StoreError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Settee operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing or contradictory constructor input.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// Database name fails charset validation under enforced safety mode.
    #[error(
        "database name may not be couchdb safe\n\tunsafe name: {unsafe_name}\n\tsafe name: {safe_name}"
    )]
    UnsafeName {
        /// The name as supplied.
        unsafe_name: String,
        /// The name after lower-casing and filtering.
        safe_name: String,
    },

    /// A batched fetch did not return an expected document.
    #[error("document not found: {id}")]
    NotFound {
        /// The missing document id.
        id: String,
    },

    /// Replication lifecycle error.
    #[error("replication error: {0}")]
    Replication(#[from] ReplicationError),

    /// Pass-through engine error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsafe_name_message_carries_both_variants() {
        let err = CoreError::UnsafeName {
            unsafe_name: "My DB!".into(),
            safe_name: "mydb".into(),
        };
        let message = err.to_string();
        assert!(message.contains("My DB!"));
        assert!(message.contains("mydb"));
    }

    #[test]
    fn store_errors_convert() {
        let err: CoreError = StoreError::not_found("x").into();
        assert!(matches!(err, CoreError::Store(_)));
    }
}
