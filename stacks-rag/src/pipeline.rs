//! Corpus ingestion pipeline.
//!
//! The [`IngestionPipeline`] coordinates the chunk → embed → upsert workflow
//! by composing a [`Chunker`], an [`EmbeddingClient`], and a [`VectorIndex`].
//! Ingestion is idempotent: re-running against a populated index is a no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stacks_rag::{IngestionPipeline, RagConfig, RecursiveChunker, InMemoryIndex};
//!
//! let pipeline = IngestionPipeline::builder()
//!     .config(RagConfig::default())
//!     .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
//!     .embedding_client(Arc::new(embedder))
//!     .vector_index(Arc::new(InMemoryIndex::new()))
//!     .index_name("library")
//!     .build()?;
//!
//! let handle = pipeline.ingest(&source).await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::Passage;
use crate::embedding::{EmbeddingClient, EmbeddingMode};
use crate::error::{RagError, Result};
use crate::source::DocumentSource;
use crate::vectorstore::{IndexHandle, VectorIndex};

/// The ingestion pipeline orchestrator.
///
/// Designed to run once at startup against a given index. Concurrent
/// ingestion runs against the same empty index can race on the
/// emptiness check and duplicate-embed; running one pipeline instance
/// per index at a time is the caller's responsibility.
pub struct IngestionPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    embedding_client: Arc<dyn EmbeddingClient>,
    vector_index: Arc<dyn VectorIndex>,
    index_name: String,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding client.
    pub fn embedding_client(&self) -> &Arc<dyn EmbeddingClient> {
        &self.embedding_client
    }

    /// Populate the vector index from a document source.
    ///
    /// Chunks every document into one ordered corpus sequence with
    /// sequential passage ids, then — only if the index is empty — embeds
    /// the chunks in batches and upserts each batch as soon as it is
    /// embedded. A populated index skips embedding entirely, even if the
    /// underlying document set has changed since it was built; rebuilds
    /// require deleting the index externally.
    ///
    /// # Errors
    ///
    /// - [`RagError::NoDocuments`] if no document yields non-blank text.
    /// - [`RagError::Ingestion`] wrapping any provider failure; the caller
    ///   may still serve requests in fallback-only mode.
    pub async fn ingest(&self, source: &dyn DocumentSource) -> Result<IndexHandle> {
        let documents = source.documents();
        let extractable =
            documents.iter().filter(|d| !d.text.trim().is_empty()).count();
        if extractable == 0 {
            error!(source = %source.describe(), "no documents with extractable text");
            return Err(RagError::NoDocuments(source.describe()));
        }

        // One ordered corpus sequence; passage ids follow ingestion order.
        let mut chunks: Vec<String> = Vec::new();
        for document in &documents {
            let document_chunks = self.chunker.chunk(&document.text);
            info!(document = %document.name, chunk_count = document_chunks.len(), "chunked document");
            chunks.extend(document_chunks);
        }

        let dimensions = self.embedding_client.dimensions();
        self.vector_index.ensure_index(&self.index_name, dimensions).await.map_err(|e| {
            error!(index = %self.index_name, error = %e, "failed to ensure index");
            RagError::Ingestion(format!("failed to ensure index '{}': {e}", self.index_name))
        })?;

        let handle = IndexHandle::new(self.vector_index.clone(), self.index_name.clone());

        if !handle.is_empty().await.map_err(|e| {
            RagError::Ingestion(format!("failed to check index '{}': {e}", self.index_name))
        })? {
            info!(index = %self.index_name, "index already populated, skipping ingestion");
            return Ok(handle);
        }

        info!(index = %self.index_name, chunk_count = chunks.len(), "index empty, embedding corpus");

        let batch_size = self.config.embed_batch_size;
        for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
            if batch_index > 0 {
                // Upstream rate limit: fixed delay between successive batches.
                tokio::time::sleep(self.config.embed_batch_delay).await;
            }

            let texts: Vec<&str> = batch.iter().map(String::as_str).collect();
            let embeddings = self
                .embedding_client
                .embed(&texts, EmbeddingMode::Document)
                .await
                .map_err(|e| {
                    error!(batch_index, error = %e, "embedding failed during ingestion");
                    RagError::Ingestion(format!("embedding failed on batch {batch_index}: {e}"))
                })?;

            let offset = batch_index * batch_size;
            let passages: Vec<Passage> = batch
                .iter()
                .zip(embeddings)
                .enumerate()
                .map(|(i, (text, embedding))| Passage {
                    id: (offset + i).to_string(),
                    text: text.clone(),
                    embedding,
                })
                .collect();

            handle.upsert(&passages).await.map_err(|e| {
                error!(batch_index, error = %e, "upsert failed during ingestion");
                RagError::Ingestion(format!("upsert failed on batch {batch_index}: {e}"))
            })?;
        }

        info!(index = %self.index_name, passage_count = chunks.len(), "ingestion complete");
        Ok(handle)
    }
}

/// Builder for constructing an [`IngestionPipeline`].
///
/// All fields are required except `config` and `index_name`, which default
/// to [`RagConfig::default()`] and `"library"`.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_client: Option<Arc<dyn EmbeddingClient>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    index_name: Option<String>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding client.
    pub fn embedding_client(mut self, client: Arc<dyn EmbeddingClient>) -> Self {
        self.embedding_client = Some(client);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    /// Set the name of the index to ingest into.
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Build the [`IngestionPipeline`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let embedding_client = self
            .embedding_client
            .ok_or_else(|| RagError::Config("embedding_client is required".to_string()))?;
        let vector_index = self
            .vector_index
            .ok_or_else(|| RagError::Config("vector_index is required".to_string()))?;

        Ok(IngestionPipeline {
            config: self.config.unwrap_or_default(),
            chunker,
            embedding_client,
            vector_index,
            index_name: self.index_name.unwrap_or_else(|| "library".to_string()),
        })
    }
}
