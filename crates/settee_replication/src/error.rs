//! Error types for replication lifecycle management.

use thiserror::Error;

/// Result type for replication operations.
pub type ReplicationResult<T> = Result<T, ReplicationError>;

/// Errors that can occur while managing a replication session.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// Replication was requested on a handle with no resolved remote url.
    #[error("replication requires a remote url")]
    MissingRemote,

    /// The requested mode is not one of `out`, `in`, `sync`.
    #[error("\"{mode}\" is not a valid replication mode")]
    InvalidMode {
        /// The offending mode string.
        mode: String,
    },

    /// The engine failed to build the session.
    #[error("store error: {0}")]
    Store(#[from] settee_store::StoreError),

    /// The terminal drain event never arrived during shutdown.
    #[error("replication session did not drain within the shutdown bound")]
    DrainTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_mode_names_the_offender() {
        let err = ReplicationError::InvalidMode {
            mode: "both".into(),
        };
        assert_eq!(err.to_string(), "\"both\" is not a valid replication mode");
    }
}
