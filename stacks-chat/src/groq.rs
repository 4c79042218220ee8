//! Groq chat completion client.
//!
//! Streams completions from the Groq OpenAI-compatible `/chat/completions`
//! endpoint using server-sent events, one `data:` line per delta fragment.

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ChatError, Result};
use crate::llm::{Llm, LlmRequest, Role, TokenStream};

/// The Groq chat completions endpoint.
const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// The default Groq model.
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Connection timeout; the stream itself is unbounded.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// An [`Llm`] backed by the Groq API.
///
/// # Example
///
/// ```rust,ignore
/// use stacks_chat::groq::GroqClient;
///
/// let client = GroqClient::from_env()?;
/// let stream = client.stream_chat(request).await?;
/// ```
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqClient {
    /// Create a new client with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatError::Model {
                provider: "Groq".into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Model {
                provider: "Groq".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, api_key, model: DEFAULT_MODEL.into() })
    }

    /// Create a new client using the `GROQ_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| ChatError::Model {
            provider: "Groq".into(),
            message: "GROQ_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `llama-3.3-70b-versatile`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

// ── Groq API request/response types ────────────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Parse one SSE line, returning the delta text if the line carries any.
fn parse_sse_line(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data: ")?.trim();
    if payload == "[DONE]" {
        return None;
    }
    let chunk: StreamChunk = serde_json::from_str(payload).ok()?;
    chunk.choices.into_iter().next().and_then(|c| c.delta.content)
}

// ── Llm implementation ─────────────────────────────────────────────

#[async_trait]
impl Llm for GroqClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn stream_chat(&self, request: LlmRequest) -> Result<TokenStream> {
        let mut messages =
            vec![ChatMessage { role: "system", content: &request.system }];
        messages.extend(
            request
                .history
                .iter()
                .map(|turn| ChatMessage { role: role_str(turn.role), content: &turn.content }),
        );

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            stream: true,
        };

        debug!(model = %self.model, turns = request.history.len(), "requesting streamed completion");

        let response = self
            .client
            .post(GROQ_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Groq", error = %e, "request failed");
                ChatError::Model {
                    provider: "Groq".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "Groq", %status, "API error");
            return Err(ChatError::Model {
                provider: "Groq".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let stream = try_stream! {
            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| ChatError::Model {
                    provider: "Groq".into(),
                    message: format!("stream error: {e}"),
                })?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim().to_string();
                    buffer.drain(..=newline);
                    if let Some(text) = parse_sse_line(&line) {
                        if !text.is_empty() {
                            yield text;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        assert!(GroqClient::new("").is_err());
    }

    #[test]
    fn parses_delta_content_from_sse_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"hel"}}]}"#;
        assert_eq!(parse_sse_line(line), Some("hel".to_string()));
    }

    #[test]
    fn done_marker_and_noise_yield_nothing() {
        assert_eq!(parse_sse_line("data: [DONE]"), None);
        assert_eq!(parse_sse_line(""), None);
        assert_eq!(parse_sse_line(": keep-alive"), None);
        assert_eq!(parse_sse_line(r#"data: {"choices":[{"delta":{}}]}"#), None);
    }
}
