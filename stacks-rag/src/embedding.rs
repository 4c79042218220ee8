//! Embedding client trait for converting text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// Which model profile an embedding request uses.
///
/// Documents and queries are embedded with asymmetric profiles on providers
/// that support them; the output dimension is the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// Embed corpus passages for storage.
    Document,
    /// Embed a user query for search.
    Query,
}

/// A client that converts text into fixed-dimension vectors.
///
/// One call maps each input text to one vector, in order. Callers are
/// responsible for respecting the provider's batch-size ceiling by splitting
/// their input into batches and issuing them sequentially; implementations do
/// not retry failed calls internally.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed(&self, texts: &[&str], mode: EmbeddingMode) -> Result<Vec<Vec<f32>>>;

    /// The dimensionality of vectors produced by this client.
    fn dimensions(&self) -> usize;
}
