//! Vector index trait for storing and searching passage embeddings.

use std::sync::Arc;

use async_trait::async_trait;

use crate::document::{Passage, ScoredPassage};
use crate::error::Result;

/// A persistent similarity index keyed by passage id.
///
/// Implementations manage named indexes of [`Passage`]s and support idempotent
/// creation, emptiness checks, batched upserts, and top-k nearest-neighbor
/// queries by cosine similarity.
///
/// `query` returns raw neighbors unfiltered by any score threshold;
/// thresholding is the retriever's responsibility.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create a named index with the given dimensionality. No-op if it
    /// already exists.
    async fn ensure_index(&self, name: &str, dimensions: usize) -> Result<()>;

    /// True iff the index holds zero vectors.
    async fn is_empty(&self, name: &str) -> Result<bool>;

    /// Insert-or-replace passages by id. Safe to call incrementally in
    /// batches.
    async fn upsert(&self, name: &str, passages: &[Passage]) -> Result<()>;

    /// Return up to `top_k` nearest neighbors ordered by descending score.
    async fn query(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>>;
}

/// A handle to one named index on a [`VectorIndex`] backend.
///
/// Returned by ingestion and consumed by the retriever. Cheap to clone and
/// safe to share across concurrent retrieval calls: the index is effectively
/// read-only after ingestion and the backend serializes its own writes.
#[derive(Clone)]
pub struct IndexHandle {
    store: Arc<dyn VectorIndex>,
    name: String,
}

impl IndexHandle {
    /// Create a handle for `name` on the given backend.
    pub fn new(store: Arc<dyn VectorIndex>, name: impl Into<String>) -> Self {
        Self { store, name: name.into() }
    }

    /// The index name this handle points at.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True iff the index holds zero vectors.
    pub async fn is_empty(&self) -> Result<bool> {
        self.store.is_empty(&self.name).await
    }

    /// Insert-or-replace passages by id.
    pub async fn upsert(&self, passages: &[Passage]) -> Result<()> {
        self.store.upsert(&self.name, passages).await
    }

    /// Return up to `top_k` nearest neighbors ordered by descending score.
    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredPassage>> {
        self.store.query(&self.name, vector, top_k).await
    }
}
