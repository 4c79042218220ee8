//! In-memory vector index using cosine similarity.
//!
//! This module provides [`InMemoryIndex`], a zero-dependency index backed by
//! a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable for
//! development, testing, and small corpora.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Passage, ScoredPassage};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// An in-memory vector index using cosine similarity for search.
///
/// Indexes are stored as nested `HashMap`s: index name → passage id → passage.
/// All operations are async-safe via `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    indexes: RwLock<HashMap<String, HashMap<String, Passage>>>,
}

impl InMemoryIndex {
    /// Create a new empty in-memory index backend.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn ensure_index(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        indexes.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn is_empty(&self, name: &str) -> Result<bool> {
        let indexes = self.indexes.read().await;
        let index = indexes.get(name).ok_or_else(|| RagError::Index {
            backend: "InMemory".to_string(),
            message: format!("index '{name}' does not exist"),
        })?;
        Ok(index.is_empty())
    }

    async fn upsert(&self, name: &str, passages: &[Passage]) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        let index = indexes.get_mut(name).ok_or_else(|| RagError::Index {
            backend: "InMemory".to_string(),
            message: format!("index '{name}' does not exist"),
        })?;
        for passage in passages {
            index.insert(passage.id.clone(), passage.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>> {
        let indexes = self.indexes.read().await;
        let index = indexes.get(name).ok_or_else(|| RagError::Index {
            backend: "InMemory".to_string(),
            message: format!("index '{name}' does not exist"),
        })?;

        let mut scored: Vec<ScoredPassage> = index
            .values()
            .map(|passage| ScoredPassage {
                id: passage.id.clone(),
                text: passage.text.clone(),
                score: cosine_similarity(&passage.embedding, vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.5, -0.25, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let store = InMemoryIndex::new();
        store.ensure_index("t", 2).await.unwrap();
        let first =
            Passage { id: "0".into(), text: "old".into(), embedding: vec![1.0, 0.0] };
        let second =
            Passage { id: "0".into(), text: "new".into(), embedding: vec![1.0, 0.0] };
        store.upsert("t", &[first]).await.unwrap();
        store.upsert("t", &[second]).await.unwrap();

        let results = store.query("t", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "new");
    }

    #[tokio::test]
    async fn is_empty_tracks_vector_count() {
        let store = InMemoryIndex::new();
        store.ensure_index("t", 2).await.unwrap();
        assert!(store.is_empty("t").await.unwrap());

        let passage =
            Passage { id: "0".into(), text: "x".into(), embedding: vec![1.0, 0.0] };
        store.upsert("t", &[passage]).await.unwrap();
        assert!(!store.is_empty("t").await.unwrap());
    }

    #[tokio::test]
    async fn query_on_missing_index_errors() {
        let store = InMemoryIndex::new();
        assert!(store.query("missing", &[1.0], 5).await.is_err());
    }
}
