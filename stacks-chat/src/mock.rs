//! Mock language model for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::llm::{Llm, LlmRequest, TokenStream};

/// An [`Llm`] that replays canned fragments and records the last request.
///
/// Optionally fails mid-stream after all fragments, to exercise the
/// error-fragment path in the generator.
#[derive(Default)]
pub struct MockLlm {
    fragments: Vec<String>,
    fail_after_fragments: bool,
    last_request: Mutex<Option<LlmRequest>>,
}

impl MockLlm {
    /// Create a mock that streams the given fragments.
    pub fn new(fragments: Vec<&str>) -> Self {
        Self {
            fragments: fragments.into_iter().map(String::from).collect(),
            fail_after_fragments: false,
            last_request: Mutex::new(None),
        }
    }

    /// After streaming all fragments, emit a provider error.
    pub fn failing_after_fragments(mut self) -> Self {
        self.fail_after_fragments = true;
        self
    }

    /// The most recent request passed to [`Llm::stream_chat`].
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(&self, request: LlmRequest) -> Result<TokenStream> {
        debug!(turns = request.history.len(), "mock completion requested");
        *self.last_request.lock().expect("mock lock poisoned") = Some(request);

        let mut items: Vec<Result<String>> =
            self.fragments.iter().cloned().map(Ok).collect();
        if self.fail_after_fragments {
            items.push(Err(ChatError::Model {
                provider: "Mock".into(),
                message: "simulated mid-stream failure".into(),
            }));
        }

        Ok(Box::pin(futures::stream::iter(items)))
    }
}
