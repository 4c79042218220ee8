//! Data types for passages and query results.

use serde::{Deserialize, Serialize};

/// A chunked, embedded unit of text stored in the vector index.
///
/// Immutable once upserted. The `id` is derived from corpus-wide ingestion
/// order and is not guaranteed stable across re-ingestion runs. All passages
/// in one index must share the embedding dimension of a single model version;
/// mixing models silently corrupts similarity scores and is not checked here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// Unique identifier within the index.
    pub id: String,
    /// The text content of the passage.
    pub text: String,
    /// The vector embedding for this passage's text.
    pub embedding: Vec<f32>,
}

/// A retrieved passage paired with a similarity score.
///
/// Scores are cosine similarities in `[-1, 1]`, higher is more relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    /// The identifier of the stored passage.
    pub id: String,
    /// The stored passage text.
    pub text: String,
    /// The similarity score against the query vector.
    pub score: f32,
}
