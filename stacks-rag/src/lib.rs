//! # stacks-rag
//!
//! The retrieval side of the stacks library chatbot: document chunking,
//! embedding, a persistent vector index, idempotent corpus ingestion, and
//! similarity-based context retrieval.
//!
//! ## Overview
//!
//! - [`RecursiveChunker`] splits raw text into overlapping passages.
//! - [`EmbeddingClient`] converts text into fixed-dimension vectors
//!   ([`CohereEmbedder`] is the reference provider).
//! - [`VectorIndex`] stores passages and answers top-k similarity queries
//!   ([`PineconeIndex`] for persistence, [`InMemoryIndex`] for tests).
//! - [`IngestionPipeline`] populates the index exactly once per corpus and
//!   returns an [`IndexHandle`].
//! - [`ContextRetriever`] turns a user query into ranked passage texts, or
//!   an empty list when nothing relevant is stored — the caller's signal to
//!   fall back to web search.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stacks_rag::{
//!     CohereEmbedder, ContextRetriever, IngestionPipeline, PineconeIndex,
//!     RagConfig, RecursiveChunker, TextFolderSource,
//! };
//!
//! let config = RagConfig::default();
//! let embedder = Arc::new(CohereEmbedder::from_env()?);
//! let pipeline = IngestionPipeline::builder()
//!     .config(config.clone())
//!     .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)))
//!     .embedding_client(embedder.clone())
//!     .vector_index(Arc::new(PineconeIndex::from_env()?))
//!     .index_name("library")
//!     .build()?;
//!
//! let handle = pipeline.ingest(&TextFolderSource::new("books")).await?;
//! let retriever = ContextRetriever::new(config, embedder, handle);
//! let context = retriever.retrieve("what is gradient descent?").await?;
//! ```

pub mod chunking;
pub mod cohere;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod pinecone;
pub mod pipeline;
pub mod retriever;
pub mod source;
pub mod vectorstore;

pub use chunking::{Chunker, RecursiveChunker};
pub use cohere::CohereEmbedder;
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Passage, ScoredPassage};
pub use embedding::{EmbeddingClient, EmbeddingMode};
pub use error::{RagError, Result};
pub use inmemory::InMemoryIndex;
pub use pinecone::PineconeIndex;
pub use pipeline::{IngestionPipeline, IngestionPipelineBuilder};
pub use retriever::ContextRetriever;
pub use source::{DocumentSource, InMemorySource, SourceDocument, TextFolderSource};
pub use vectorstore::{IndexHandle, VectorIndex};
