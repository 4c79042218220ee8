//! # stacks-chat
//!
//! The generation side of the stacks library chatbot: a streamed LLM seam,
//! domain gating, web-search fallback, and the per-request orchestration
//! that ties them to `stacks-rag` retrieval.
//!
//! ## Overview
//!
//! - [`Llm`] is the model seam; [`GroqClient`] streams completions over the
//!   Groq OpenAI-compatible API, [`MockLlm`] serves tests.
//! - [`KeywordDomainGate`] restricts answers to the configured domain,
//!   refusing with the fixed [`REFUSAL_SENTENCE`].
//! - [`WebSearch`] / [`SerpApiSearch`] produce substitute context when the
//!   library has nothing relevant; this path never fails a request.
//! - [`ResponseGenerator`] builds the domain-constrained system instruction
//!   (context capped at 4000 characters) and streams the answer as a
//!   cancellable [`AnswerStream`].
//! - [`ChatService`] runs the request pipeline: retrieve, fall back, generate.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stacks_chat::{
//!     ChatService, GeneratorConfig, GroqClient, KeywordDomainGate,
//!     ResponseGenerator, ResponseStyle, SerpApiSearch, Turn,
//! };
//!
//! let service = ChatService::builder()
//!     .retriever(retriever)
//!     .web_search(Arc::new(SerpApiSearch::from_env()))
//!     .domain_gate(KeywordDomainGate::new())
//!     .generator(ResponseGenerator::new(
//!         Arc::new(GroqClient::from_env()?),
//!         GeneratorConfig::default(),
//!     ))
//!     .build()?;
//!
//! let history = vec![Turn::user("What is gradient descent?")];
//! let outcome = service.chat(&history, ResponseStyle::Detailed).await;
//! let answer = outcome.stream.collect_text().await;
//! ```

pub mod domain;
pub mod error;
pub mod generator;
pub mod groq;
pub mod llm;
pub mod mock;
pub mod service;
pub mod websearch;

pub use domain::{KeywordDomainGate, REFUSAL_SENTENCE};
pub use error::{ChatError, Result};
pub use generator::{
    AnswerContext, AnswerStream, GeneratorConfig, ResponseGenerator, ResponseStyle,
    SOURCE_GENERAL, SOURCE_LIBRARY,
};
pub use groq::GroqClient;
pub use llm::{Llm, LlmRequest, Role, TokenStream, Turn};
pub use mock::MockLlm;
pub use service::{ChatOutcome, ChatService, ChatServiceBuilder, ContextSource};
pub use websearch::{
    NO_WEB_RESULTS, SerpApiSearch, WEB_SEARCH_FAILED, WEB_SEARCH_UNAVAILABLE, WebSearch,
};
