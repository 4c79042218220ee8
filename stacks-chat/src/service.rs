//! The per-request chat orchestration.
//!
//! One request moves through retrieval, optional web-search fallback, and
//! streamed generation in that order: retrieval completes (or explicitly
//! fails over) before generation begins, never speculatively in parallel.

use std::sync::Arc;

use tracing::{info, warn};

use stacks_rag::ContextRetriever;

use crate::domain::{KeywordDomainGate, REFUSAL_SENTENCE};
use crate::error::{ChatError, Result};
use crate::generator::{AnswerContext, AnswerStream, ResponseGenerator, ResponseStyle};
use crate::llm::Turn;
use crate::websearch::WebSearch;

/// Where the context for an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSource {
    /// Passages retrieved from the document corpus.
    Library,
    /// Snippets from the web-search fallback.
    Web,
    /// No context; the model answered from general knowledge.
    None,
    /// The query was judged out of domain and refused without generation.
    Refused,
}

/// The outcome of one chat request: the answer stream and its provenance.
pub struct ChatOutcome {
    /// The streamed answer fragments.
    pub stream: AnswerStream,
    /// Where the supplied context came from.
    pub source: ContextSource,
}

/// Orchestrates retrieval, fallback, and generation for chat requests.
///
/// Holds no mutable state; the only shared resource is the index handle
/// inside the retriever, which is read-only after ingestion, so one service
/// instance safely serves concurrent requests.
pub struct ChatService {
    retriever: ContextRetriever,
    web: Arc<dyn WebSearch>,
    gate: KeywordDomainGate,
    generator: ResponseGenerator,
}

impl ChatService {
    /// Create a new [`ChatServiceBuilder`].
    pub fn builder() -> ChatServiceBuilder {
        ChatServiceBuilder::default()
    }

    /// Answer the conversation's latest user turn.
    ///
    /// `history` is the full prior conversation plus the new user turn;
    /// its last turn is the query. The caller persists the exchange after
    /// draining the stream.
    ///
    /// Out-of-domain queries short-circuit before any provider spend: the
    /// outcome is a one-fragment stream of exactly the fixed refusal
    /// sentence. Retrieval errors are logged and treated as "no context";
    /// the request still produces an answer.
    pub async fn chat(&self, history: &[Turn], style: ResponseStyle) -> ChatOutcome {
        let query = history.last().map(|t| t.content.as_str()).unwrap_or_default();

        if !self.gate.allows(query) {
            info!("query judged out of domain, refusing");
            return ChatOutcome {
                stream: AnswerStream::of_text(REFUSAL_SENTENCE),
                source: ContextSource::Refused,
            };
        }

        let passages = match self.retriever.retrieve(query).await {
            Ok(passages) => passages,
            Err(e) => {
                // Degraded, not fatal: fall through to web search.
                warn!(error = %e, "retrieval failed, treating as no context");
                Vec::new()
            }
        };

        let (context, source) = if passages.is_empty() {
            info!("no library context found, falling back to web search");
            let snippets = self.web.search(query).await;
            let context = AnswerContext::from_web(snippets);
            let source =
                if context.is_empty() { ContextSource::None } else { ContextSource::Web };
            (context, source)
        } else {
            (AnswerContext::from_passages(&passages), ContextSource::Library)
        };

        let stream = self.generator.generate(history, &context, style);
        ChatOutcome { stream, source }
    }
}

/// Builder for constructing a [`ChatService`].
#[derive(Default)]
pub struct ChatServiceBuilder {
    retriever: Option<ContextRetriever>,
    web: Option<Arc<dyn WebSearch>>,
    gate: Option<KeywordDomainGate>,
    generator: Option<ResponseGenerator>,
}

impl ChatServiceBuilder {
    /// Set the context retriever over the ingested index.
    pub fn retriever(mut self, retriever: ContextRetriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the web search fallback.
    pub fn web_search(mut self, web: Arc<dyn WebSearch>) -> Self {
        self.web = Some(web);
        self
    }

    /// Set the domain gate. Defaults to the data-science keyword gate.
    pub fn domain_gate(mut self, gate: KeywordDomainGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Set the response generator.
    pub fn generator(mut self, generator: ResponseGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`ChatService`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if any required field is missing.
    pub fn build(self) -> Result<ChatService> {
        let retriever =
            self.retriever.ok_or_else(|| ChatError::Config("retriever is required".to_string()))?;
        let web =
            self.web.ok_or_else(|| ChatError::Config("web_search is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| ChatError::Config("generator is required".to_string()))?;

        Ok(ChatService { retriever, web, gate: self.gate.unwrap_or_default(), generator })
    }
}
