//! Response generation: prompt construction and streamed completion.
//!
//! The [`ResponseGenerator`] turns conversation history plus retrieved (or
//! web-searched) context into a domain-constrained system instruction and
//! streams the model's answer as an [`AnswerStream`]. Provider failures are
//! folded into the stream as one final error fragment, so the caller always
//! has text to show the user.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::{error, info};

use crate::domain::REFUSAL_SENTENCE;
use crate::llm::{Llm, LlmRequest, Turn};

/// The provenance tag for answers grounded in the document corpus.
pub const SOURCE_LIBRARY: &str = "Source: Data Science Library";

/// The provenance tag for answers from the model's own knowledge.
pub const SOURCE_GENERAL: &str = "Source: General Knowledge";

/// How verbose the generated answer should be.
///
/// Only instruction wording varies by style; domain gating and the source
/// note requirement are invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseStyle {
    /// Direct, short answers.
    Concise,
    /// Comprehensive answers.
    #[default]
    Detailed,
}

/// Context supplied to the model for one answer.
///
/// Normalizes library passages, web snippets, or nothing into one string.
#[derive(Debug, Clone, Default)]
pub struct AnswerContext {
    text: String,
}

impl AnswerContext {
    /// No context: the model answers from general knowledge.
    pub fn none() -> Self {
        Self::default()
    }

    /// Context from retrieved library passages, joined by blank lines.
    pub fn from_passages(passages: &[String]) -> Self {
        Self { text: passages.join("\n\n") }
    }

    /// Context from web search snippet text.
    pub fn from_web(snippets: impl Into<String>) -> Self {
        Self { text: snippets.into() }
    }

    /// True if no context text is available.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// The context text truncated to at most `cap` characters.
    fn truncated(&self, cap: usize) -> String {
        if self.text.chars().count() <= cap {
            return self.text.clone();
        }
        self.text.chars().take(cap).collect()
    }
}

/// Configuration for the response generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// The assistant's name used in the persona line.
    pub assistant_name: String,
    /// Hard cap on context characters sent to the model.
    pub context_char_cap: usize,
    /// Sampling temperature for completions.
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { assistant_name: "Stacks".to_string(), context_char_cap: 4000, temperature: 0.1 }
    }
}

/// A cancellable, single-pass stream of answer fragments.
///
/// The consumer concatenates fragments in order. Dropping the stream — or
/// calling [`close`](AnswerStream::close) — releases the underlying provider
/// connection; the stream cannot be restarted.
pub struct AnswerStream {
    inner: Option<Pin<Box<dyn Stream<Item = String> + Send>>>,
}

impl AnswerStream {
    fn new(inner: Pin<Box<dyn Stream<Item = String> + Send>>) -> Self {
        Self { inner: Some(inner) }
    }

    /// A stream that yields `text` as its only fragment.
    pub fn of_text(text: impl Into<String>) -> Self {
        Self::new(Box::pin(futures::stream::once(futures::future::ready(text.into()))))
    }

    /// Stop consuming and release the underlying connection.
    ///
    /// Subsequent polls return end-of-stream.
    pub fn close(&mut self) {
        self.inner = None;
    }

    /// Drain the stream, concatenating all fragments.
    pub async fn collect_text(mut self) -> String {
        let mut out = String::new();
        while let Some(fragment) = self.next().await {
            out.push_str(&fragment);
        }
        out
    }
}

impl Stream for AnswerStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        match self.inner.as_mut() {
            Some(inner) => inner.as_mut().poll_next(cx),
            None => Poll::Ready(None),
        }
    }
}

/// Builds domain-constrained prompts and streams model completions.
pub struct ResponseGenerator {
    llm: Arc<dyn Llm>,
    config: GeneratorConfig,
}

impl ResponseGenerator {
    /// Create a generator over the given model.
    pub fn new(llm: Arc<dyn Llm>, config: GeneratorConfig) -> Self {
        Self { llm, config }
    }

    /// The provenance tag for the given context.
    pub fn source_note(context: &AnswerContext) -> &'static str {
        if context.is_empty() { SOURCE_GENERAL } else { SOURCE_LIBRARY }
    }

    /// Build the system instruction for one request.
    ///
    /// Embeds the persona, the (truncated) context block, the in-domain-only
    /// instruction with the fixed refusal sentence, and the instruction to
    /// append the source note after the answer.
    pub fn build_system_instruction(
        &self,
        context: &AnswerContext,
        style: ResponseStyle,
    ) -> String {
        let context_str = context.truncated(self.config.context_char_cap);
        let source_note = Self::source_note(context);
        let name = &self.config.assistant_name;

        match style {
            ResponseStyle::Concise => format!(
                "You are {name}, a helpful data science assistant. \
                 Answer the user's latest question based only on the provided CONTEXT when available. \
                 If the question is outside the scope of data science, you must respond with \
                 '{REFUSAL_SENTENCE}' and nothing else. \
                 Be direct and concise. After the answer, append the SOURCE NOTE.\n\n\
                 CONTEXT:\n{context_str}\n\nSOURCE NOTE: {source_note}"
            ),
            ResponseStyle::Detailed => format!(
                "You are {name}, a helpful data science assistant. \
                 Provide a detailed and comprehensive answer using the CONTEXT when available. \
                 If the question is outside the scope of data science, you must respond with \
                 '{REFUSAL_SENTENCE}' and nothing else. \
                 Synthesize information clearly, then append the SOURCE NOTE.\n\n\
                 CONTEXT:\n{context_str}\n\nSOURCE NOTE: {source_note}"
            ),
        }
    }

    /// Stream an answer for the conversation so far.
    ///
    /// `history` is the full prior conversation plus the new user turn.
    /// Never fails: a provider error before or during streaming surfaces as
    /// one final fragment describing the error, so partial output already
    /// delivered is not lost.
    pub fn generate(
        &self,
        history: &[Turn],
        context: &AnswerContext,
        style: ResponseStyle,
    ) -> AnswerStream {
        let request = LlmRequest {
            system: self.build_system_instruction(context, style),
            history: history.to_vec(),
            temperature: self.config.temperature,
        };
        let llm = self.llm.clone();

        let fragments = stream! {
            info!(model = llm.name(), "generation started");
            match llm.stream_chat(request).await {
                Ok(mut tokens) => {
                    while let Some(item) = tokens.next().await {
                        match item {
                            Ok(fragment) => yield fragment,
                            Err(e) => {
                                error!(error = %e, "provider failed mid-stream");
                                yield format!("Error generating response from LLM: {e}");
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "completion request failed");
                    yield format!("Error generating response from LLM: {e}");
                }
            }
        };

        AnswerStream::new(Box::pin(fragments))
    }
}
