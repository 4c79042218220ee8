//! Pinecone vector index backend.
//!
//! Provides [`PineconeIndex`] which implements [`VectorIndex`] against the
//! Pinecone REST API: the control plane (`api.pinecone.io`) for index
//! creation and host discovery, and the per-index data plane for stats,
//! upserts, and queries. Passage text is stored as `metadata.text`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::document::{Passage, ScoredPassage};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// The Pinecone control plane base URL.
const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// Request timeout for index calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A [`VectorIndex`] backed by [Pinecone](https://www.pinecone.io/).
///
/// Indexes are created as serverless with cosine metric. Data-plane hosts
/// are resolved through the control plane once per index and cached.
///
/// # Example
///
/// ```rust,ignore
/// use stacks_rag::pinecone::PineconeIndex;
///
/// let index = PineconeIndex::from_env()?;
/// index.ensure_index("library", 1024).await?;
/// ```
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    cloud: String,
    region: String,
    hosts: RwLock<HashMap<String, String>>,
}

impl PineconeIndex {
    /// Create a new backend with the given API key.
    ///
    /// Serverless indexes are created on `aws`/`us-east-1` by default.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Index {
                backend: "Pinecone".into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build().map_err(|e| {
            RagError::Index {
                backend: "Pinecone".into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            api_key,
            cloud: "aws".into(),
            region: "us-east-1".into(),
            hosts: RwLock::new(HashMap::new()),
        })
    }

    /// Create a new backend using the `PINECONE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PINECONE_API_KEY").map_err(|_| RagError::Index {
            backend: "Pinecone".into(),
            message: "PINECONE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the serverless cloud and region used when creating indexes.
    pub fn with_serverless_spec(
        mut self,
        cloud: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        self.cloud = cloud.into();
        self.region = region.into();
        self
    }

    fn map_err(context: &str, e: reqwest::Error) -> RagError {
        error!(backend = "Pinecone", error = %e, context, "request failed");
        RagError::Index { backend: "Pinecone".into(), message: format!("{context}: {e}") }
    }

    async fn status_err(context: &str, response: reqwest::Response) -> RagError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!(backend = "Pinecone", %status, context, "API error");
        RagError::Index {
            backend: "Pinecone".into(),
            message: format!("{context}: API returned {status}: {body}"),
        }
    }

    /// Resolve the data-plane host for an index, consulting the cache first.
    async fn host(&self, name: &str) -> Result<String> {
        if let Some(host) = self.hosts.read().await.get(name) {
            return Ok(host.clone());
        }

        let response = self
            .client
            .get(format!("{CONTROL_PLANE_URL}/indexes/{name}"))
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Self::map_err("describe index", e))?;

        if !response.status().is_success() {
            return Err(Self::status_err("describe index", response).await);
        }

        let described: DescribeIndexResponse =
            response.json().await.map_err(|e| Self::map_err("parse describe response", e))?;

        let mut hosts = self.hosts.write().await;
        hosts.insert(name.to_string(), described.host.clone());
        Ok(described.host)
    }
}

// ── Pinecone API request/response types ────────────────────────────

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: VectorMetadata<'a>,
}

#[derive(Serialize)]
struct VectorMetadata<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: u64,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize)]
struct MatchMetadata {
    #[serde(default)]
    text: String,
}

// ── VectorIndex implementation ─────────────────────────────────────

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn ensure_index(&self, name: &str, dimensions: usize) -> Result<()> {
        let response = self
            .client
            .get(format!("{CONTROL_PLANE_URL}/indexes/{name}"))
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Self::map_err("describe index", e))?;

        if response.status().is_success() {
            debug!(index = name, "index already exists, skipping creation");
            let described: DescribeIndexResponse =
                response.json().await.map_err(|e| Self::map_err("parse describe response", e))?;
            self.hosts.write().await.insert(name.to_string(), described.host);
            return Ok(());
        }

        if response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(Self::status_err("describe index", response).await);
        }

        info!(index = name, dimensions, "creating index");
        let body = json!({
            "name": name,
            "dimension": dimensions,
            "metric": "cosine",
            "spec": { "serverless": { "cloud": self.cloud, "region": self.region } },
        });

        let response = self
            .client
            .post(format!("{CONTROL_PLANE_URL}/indexes"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_err("create index", e))?;

        if !response.status().is_success() {
            return Err(Self::status_err("create index", response).await);
        }

        let created: DescribeIndexResponse =
            response.json().await.map_err(|e| Self::map_err("parse create response", e))?;
        self.hosts.write().await.insert(name.to_string(), created.host);
        Ok(())
    }

    async fn is_empty(&self, name: &str) -> Result<bool> {
        let host = self.host(name).await?;
        let response = self
            .client
            .post(format!("https://{host}/describe_index_stats"))
            .header("Api-Key", &self.api_key)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| Self::map_err("describe index stats", e))?;

        if !response.status().is_success() {
            return Err(Self::status_err("describe index stats", response).await);
        }

        let stats: StatsResponse =
            response.json().await.map_err(|e| Self::map_err("parse stats response", e))?;
        Ok(stats.total_vector_count == 0)
    }

    async fn upsert(&self, name: &str, passages: &[Passage]) -> Result<()> {
        if passages.is_empty() {
            return Ok(());
        }

        let host = self.host(name).await?;
        let vectors: Vec<UpsertVector<'_>> = passages
            .iter()
            .map(|p| UpsertVector {
                id: &p.id,
                values: &p.embedding,
                metadata: VectorMetadata { text: &p.text },
            })
            .collect();

        let response = self
            .client
            .post(format!("https://{host}/vectors/upsert"))
            .header("Api-Key", &self.api_key)
            .json(&json!({ "vectors": vectors }))
            .send()
            .await
            .map_err(|e| Self::map_err("upsert vectors", e))?;

        if !response.status().is_success() {
            return Err(Self::status_err("upsert vectors", response).await);
        }

        debug!(index = name, count = passages.len(), "upserted passages");
        Ok(())
    }

    async fn query(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>> {
        let host = self.host(name).await?;
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });

        let response = self
            .client
            .post(format!("https://{host}/query"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_err("query", e))?;

        if !response.status().is_success() {
            return Err(Self::status_err("query", response).await);
        }

        let parsed: QueryResponse =
            response.json().await.map_err(|e| Self::map_err("parse query response", e))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| ScoredPassage {
                id: m.id,
                text: m.metadata.map(|meta| meta.text).unwrap_or_default(),
                score: m.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        assert!(PineconeIndex::new("").is_err());
    }

    #[test]
    fn query_response_parses_matches() {
        let body = r#"{
            "matches": [
                {"id": "0", "score": 0.82, "metadata": {"text": "a passage"}},
                {"id": "3", "score": 0.41, "metadata": null}
            ]
        }"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.matches.len(), 2);
        assert_eq!(parsed.matches[0].metadata.as_ref().unwrap().text, "a passage");
        assert!(parsed.matches[1].metadata.is_none());
    }

    #[test]
    fn stats_response_defaults_to_zero() {
        let parsed: StatsResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.total_vector_count, 0);
    }
}
