//! Language model trait and conversation types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
    /// The assistant.
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// Who produced the turn.
    pub role: Role,
    /// The turn's text content.
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A chat completion request: a system instruction plus prior turns.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// The system instruction prepended to the conversation.
    pub system: String,
    /// The full prior conversation including the new user turn.
    pub history: Vec<Turn>,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A lazy, single-pass stream of completion text fragments.
///
/// Fragments arrive asynchronously in generation order. A provider failure
/// mid-stream surfaces as one `Err` item, after which the stream ends.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A language model that streams chat completions.
#[async_trait]
pub trait Llm: Send + Sync {
    /// The model name, for logging.
    fn name(&self) -> &str;

    /// Request a streamed completion.
    ///
    /// Dropping the returned stream before exhaustion aborts the underlying
    /// provider connection; no resources outlive the stream.
    async fn stream_chat(&self, request: LlmRequest) -> Result<TokenStream>;
}
