//! Error types for the `rag-storage` crate.

use thiserror::Error;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The vector database could not be reached within the configured timeout.
    #[error("Connection error ({endpoint}): {message}")]
    ConnectionError {
        /// The endpoint the client was talking to.
        endpoint: String,
        /// A description of the failure.
        message: String,
    },

    /// Caller-supplied input has an invalid shape.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The vector database rejected a well-formed request.
    #[error("Service error ({backend}): {message}")]
    ServiceError {
        /// The backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An existing collection was created with a different vector size.
    #[error("Collection '{collection}' has dimensionality {actual}, expected {expected}")]
    DimensionMismatch {
        /// The collection name.
        collection: String,
        /// The dimensionality the adapter was configured with.
        expected: usize,
        /// The dimensionality reported by the service.
        actual: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Returns `true` for errors caused by an unreachable or slow endpoint.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionError { .. })
    }
}

/// A convenience result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
