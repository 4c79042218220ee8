//! Error types for the `stacks-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval pipeline operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error returned by the embedding provider.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error returned by the vector index backend.
    #[error("Vector index error ({backend}): {message}")]
    Index {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The document source yielded no documents with extractable text.
    #[error("No documents with extractable text found in source '{0}'")]
    NoDocuments(String),

    /// An error during corpus ingestion.
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// An error during context retrieval.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
