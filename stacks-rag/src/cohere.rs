//! Cohere embedding client using the Cohere embed API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::{EmbeddingClient, EmbeddingMode};
use crate::error::{RagError, Result};

/// The Cohere embed API endpoint.
const COHERE_EMBED_URL: &str = "https://api.cohere.com/v1/embed";

/// The default Cohere embedding model.
const DEFAULT_MODEL: &str = "embed-english-v3.0";

/// The output dimensionality of `embed-english-v3.0`.
const DEFAULT_DIMENSIONS: usize = 1024;

/// Request timeout for embedding calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// An [`EmbeddingClient`] backed by the Cohere embed API.
///
/// Uses `reqwest` to call the `/v1/embed` endpoint directly. The `input_type`
/// field is set from the [`EmbeddingMode`]: `search_document` for corpus
/// passages, `search_query` for user queries.
///
/// # Example
///
/// ```rust,ignore
/// use stacks_rag::cohere::CohereEmbedder;
///
/// let embedder = CohereEmbedder::from_env()?;
/// let vectors = embedder.embed(&["hello world"], EmbeddingMode::Query).await?;
/// ```
pub struct CohereEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl CohereEmbedder {
    /// Create a new client with the given API key.
    ///
    /// Uses the default model (`embed-english-v3.0`, 1024 dimensions) and a
    /// 60-second request timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "Cohere".into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build().map_err(|e| {
            RagError::Embedding {
                provider: "Cohere".into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self { client, api_key, model: DEFAULT_MODEL.into(), dimensions: DEFAULT_DIMENSIONS })
    }

    /// Create a new client using the `COHERE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COHERE_API_KEY").map_err(|_| RagError::Embedding {
            provider: "Cohere".into(),
            message: "COHERE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name and its output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

// ── Cohere API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: Vec<&'a str>,
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

// ── EmbeddingClient implementation ─────────────────────────────────

#[async_trait]
impl EmbeddingClient for CohereEmbedder {
    async fn embed(&self, texts: &[&str], mode: EmbeddingMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let input_type = match mode {
            EmbeddingMode::Document => "search_document",
            EmbeddingMode::Query => "search_query",
        };

        debug!(
            provider = "Cohere",
            batch_size = texts.len(),
            model = %self.model,
            input_type,
            "embedding batch"
        );

        let request_body =
            EmbedRequest { model: &self.model, texts: texts.to_vec(), input_type };

        let response = self
            .client
            .post(COHERE_EMBED_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Cohere", error = %e, "request failed");
                RagError::Embedding {
                    provider: "Cohere".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.message).unwrap_or(body);

            error!(provider = "Cohere", %status, "API error");
            return Err(RagError::Embedding {
                provider: "Cohere".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = "Cohere", error = %e, "failed to parse response");
            RagError::Embedding {
                provider: "Cohere".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(RagError::Embedding {
                provider: "Cohere".into(),
                message: format!(
                    "API returned {} embeddings for {} texts",
                    embed_response.embeddings.len(),
                    texts.len()
                ),
            });
        }

        Ok(embed_response.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        assert!(CohereEmbedder::new("").is_err());
    }

    #[test]
    fn reports_default_dimensions() {
        let embedder = CohereEmbedder::new("test-key").unwrap();
        assert_eq!(embedder.dimensions(), 1024);
    }

    #[test]
    fn model_override_updates_dimensions() {
        let embedder =
            CohereEmbedder::new("test-key").unwrap().with_model("embed-multilingual-light-v3.0", 384);
        assert_eq!(embedder.dimensions(), 384);
    }
}
