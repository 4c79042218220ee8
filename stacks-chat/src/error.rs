//! Error types for the `stacks-chat` crate.

use thiserror::Error;

/// Errors that can occur during answer generation.
#[derive(Debug, Error)]
pub enum ChatError {
    /// An error returned by the language-model provider.
    #[error("Model error ({provider}): {message}")]
    Model {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
