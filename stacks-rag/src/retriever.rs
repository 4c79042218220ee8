//! Similarity-based context retrieval.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::RagConfig;
use crate::embedding::{EmbeddingClient, EmbeddingMode};
use crate::error::{RagError, Result};
use crate::vectorstore::IndexHandle;

/// Retrieves ranked passage texts for a query.
///
/// Embeds the query, asks the index for the top-k nearest neighbors, and
/// keeps only passages scoring strictly above the similarity threshold.
/// An empty result is the designed signal for "no relevant local context"
/// and triggers the caller's fallback path; it is not an error.
pub struct ContextRetriever {
    config: RagConfig,
    embedding_client: Arc<dyn EmbeddingClient>,
    handle: IndexHandle,
}

impl ContextRetriever {
    /// Create a retriever over an ingested index.
    pub fn new(
        config: RagConfig,
        embedding_client: Arc<dyn EmbeddingClient>,
        handle: IndexHandle,
    ) -> Self {
        Self { config, embedding_client, handle }
    }

    /// Retrieve passage texts relevant to `query`, best first.
    ///
    /// Returns an empty `Vec` when nothing scores above the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Retrieval`] on embedding or index failures.
    /// Callers treat this the same as "no context" for fallback purposes
    /// but log it distinctly.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        let vectors = self
            .embedding_client
            .embed(&[query], EmbeddingMode::Query)
            .await
            .map_err(|e| {
                error!(error = %e, "query embedding failed");
                RagError::Retrieval(format!("query embedding failed: {e}"))
            })?;
        let query_vector = vectors.into_iter().next().ok_or_else(|| {
            RagError::Retrieval("embedding client returned no vector for query".to_string())
        })?;

        let results =
            self.handle.query(&query_vector, self.config.top_k).await.map_err(|e| {
                error!(index = self.handle.name(), error = %e, "index query failed");
                RagError::Retrieval(format!("index query failed: {e}"))
            })?;

        let threshold = self.config.similarity_threshold;
        let passages: Vec<String> = results
            .into_iter()
            .filter(|r| r.score > threshold)
            .map(|r| r.text)
            .collect();

        info!(result_count = passages.len(), "retrieval completed");
        Ok(passages)
    }
}
