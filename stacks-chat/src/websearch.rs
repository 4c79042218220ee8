//! Web search fallback.
//!
//! When retrieval finds no relevant local passage, the chat service asks a
//! web search engine for substitute context. This path degrades gracefully:
//! it always returns some text and never fails a request.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, warn};

/// Returned when the engine reports zero organic results.
pub const NO_WEB_RESULTS: &str = "No relevant web results found.";

/// Returned on transport, auth, or decode failure.
pub const WEB_SEARCH_FAILED: &str = "Web search failed.";

/// Returned when no API key is configured.
pub const WEB_SEARCH_UNAVAILABLE: &str =
    "Web search unavailable (SERPAPI_API_KEY not configured).";

/// Number of organic results folded into the substitute context.
const RESULT_COUNT: usize = 3;

/// Request timeout for search calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A web search engine producing substitute context text.
///
/// `search` never returns an error: failures surface as fixed informational
/// strings so the request can still be answered from general knowledge.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web for `query` and render the results as context text.
    async fn search(&self, query: &str) -> String;
}

/// A [`WebSearch`] backed by [SerpApi](https://serpapi.com/)'s Google engine.
///
/// The top three organic results are rendered as `title`, `snippet`, `link`
/// blocks separated by blank lines.
pub struct SerpApiSearch {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl SerpApiSearch {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        Self {
            client: Self::http_client(),
            api_key: if key.is_empty() { None } else { Some(key) },
        }
    }

    /// Create a client from the `SERPAPI_API_KEY` environment variable.
    ///
    /// A missing key is not an error; searches report unavailability instead.
    pub fn from_env() -> Self {
        match std::env::var("SERPAPI_API_KEY") {
            Ok(key) if !key.is_empty() => Self::new(key),
            _ => {
                warn!("SERPAPI_API_KEY not set, web search disabled");
                Self { client: Self::http_client(), api_key: None }
            }
        }
    }

    fn http_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }
}

// ── SerpApi response types ─────────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct OrganicResult {
    title: String,
    snippet: String,
    link: String,
}

#[async_trait]
impl WebSearch for SerpApiSearch {
    async fn search(&self, query: &str) -> String {
        let Some(api_key) = &self.api_key else {
            return WEB_SEARCH_UNAVAILABLE.to_string();
        };

        let response = self
            .client
            .get("https://serpapi.com/search")
            .query(&[
                ("q", query),
                ("api_key", api_key),
                ("engine", "google"),
                ("num", "3"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                error!(status = %r.status(), "web search returned an error status");
                return WEB_SEARCH_FAILED.to_string();
            }
            Err(e) => {
                error!(error = %e, "web search request failed");
                return WEB_SEARCH_FAILED.to_string();
            }
        };

        let parsed: SearchResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "failed to decode web search response");
                return WEB_SEARCH_FAILED.to_string();
            }
        };

        if parsed.organic_results.is_empty() {
            return NO_WEB_RESULTS.to_string();
        }

        info!(result_count = parsed.organic_results.len().min(RESULT_COUNT), "web search completed");
        parsed
            .organic_results
            .iter()
            .take(RESULT_COUNT)
            .map(|r| format!("{}\n{}\n{}", r.title, r.snippet, r.link))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reports_unavailability_without_calling_out() {
        let search = SerpApiSearch { client: SerpApiSearch::http_client(), api_key: None };
        assert_eq!(search.search("anything").await, WEB_SEARCH_UNAVAILABLE);
    }

    #[test]
    fn response_parses_partial_results() {
        let body = r#"{
            "organic_results": [
                {"title": "T1", "snippet": "S1", "link": "L1"},
                {"title": "T2"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.organic_results.len(), 2);
        assert_eq!(parsed.organic_results[1].snippet, "");
    }

    #[test]
    fn empty_body_parses_to_no_results() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.organic_results.is_empty());
    }
}
