use std::time::Duration;
use thiserror::Error;

use crate::core::client::database::DatabaseError;

/// Result type for bootstrapper operations
pub type BootstrapperResult<T> = Result<T, BootstrapperError>;

/// Error types for the bootstrapper
#[derive(Error, Debug)]
pub enum BootstrapperError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    /// The collection was dropped but creating its indexes failed.
    /// Existing data is already gone at this point.
    #[error("Collection {collection} was dropped but index creation failed: {source}")]
    IndexCreationFailed {
        collection: String,
        #[source]
        source: DatabaseError,
    },

    /// The collection was dropped but the run did not reach the expected index set,
    /// either because the read-back differs or because the deadline passed.
    #[error("Collection {collection} was dropped but its indexes are incomplete: {reason}")]
    PartialBootstrap { collection: String, reason: String },

    /// Index set of an existing collection differs from the expected one
    #[error("Collection {collection} does not match the expected index set: {details}")]
    VerificationFailed { collection: String, details: String },

    /// The overall deadline passed before the collection was dropped.
    #[error("Bootstrap did not finish within {0:?}")]
    Timeout(Duration),
}

impl BootstrapperError {
    /// True when the collection was dropped and the run stopped before reaching the expected index set.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::IndexCreationFailed { .. } | Self::PartialBootstrap { .. })
    }

    /// True when the failure happened before anything on the server was modified.
    pub fn left_collection_untouched(&self) -> bool {
        match self {
            Self::ConfigError(_) => true,
            Self::DatabaseError(e) => e.is_connection_error(),
            _ => false,
        }
    }
}
