//! Conversation threads and the versioned on-disk schema.
//!
//! Thread files carry an explicit `version` field. Older deployments wrote
//! two unversioned shapes (a flat message array, then a bare thread array);
//! both are migrated in one step when a file is loaded, so the rest of the
//! crate only ever sees the current schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use stacks_chat::Role;

use crate::error::Result;

/// Current thread-file schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Title given to threads that have no user message to derive one from.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Maximum characters of a message used for titles and previews.
const SNIPPET_CHARS: usize = 60;

/// One message within a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub ts: DateTime<Utc>,
}

impl Message {
    /// Create a message timestamped now.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), ts: Utc::now() }
    }
}

/// One conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Thread {
    /// Create an empty thread with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// A short preview of the latest message, for thread listings.
    pub fn preview(&self) -> String {
        self.messages.last().map(|m| snippet(&m.content)).unwrap_or_default()
    }
}

/// The on-disk thread file, current schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadFile {
    pub version: u32,
    pub threads: Vec<Thread>,
}

impl ThreadFile {
    /// An empty file at the current schema version.
    pub fn empty() -> Self {
        Self { version: SCHEMA_VERSION, threads: Vec::new() }
    }

    /// Parse a thread file, migrating unversioned legacy shapes.
    ///
    /// Returns the parsed file and whether a migration was applied (the
    /// caller rewrites the file once so migration never runs twice).
    pub fn from_value(value: Value) -> Result<(Self, bool)> {
        if value.is_object() && value.get("version").is_some() {
            let file: ThreadFile = serde_json::from_value(value)?;
            if file.version != SCHEMA_VERSION {
                return Err(serde_err(format!(
                    "unsupported thread file version {}",
                    file.version
                )));
            }
            return Ok((file, false));
        }

        if let Value::Array(items) = &value {
            // Bare thread array: objects carrying a messages field.
            if items.iter().all(|i| i.get("messages").is_some()) {
                let threads: Vec<Thread> = serde_json::from_value(value)?;
                info!(thread_count = threads.len(), "migrated unversioned thread array");
                return Ok((Self { version: SCHEMA_VERSION, threads }, true));
            }

            // Flat message array from the earliest deployments: one thread.
            let legacy: Vec<LegacyMessage> = serde_json::from_value(value)?;
            let thread = Thread::from_legacy(legacy);
            info!(message_count = thread.messages.len(), "migrated flat message history");
            return Ok((Self { version: SCHEMA_VERSION, threads: vec![thread] }, true));
        }

        Err(serde_err("thread file matches no known schema".to_string()))
    }
}

/// Message shape written before threads existed; no timestamps.
#[derive(Debug, Deserialize)]
struct LegacyMessage {
    role: Role,
    content: String,
}

impl Thread {
    fn from_legacy(legacy: Vec<LegacyMessage>) -> Self {
        let title = legacy
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| snippet(&m.content))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            created_at: now,
            updated_at: now,
            messages: legacy
                .into_iter()
                .map(|m| Message { role: m.role, content: m.content, ts: now })
                .collect(),
        }
    }
}

/// Derive a thread title from the opening user prompt.
pub fn derive_title(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() { DEFAULT_TITLE.to_string() } else { snippet(trimmed) }
}

fn snippet(text: &str) -> String {
    let count = text.chars().count();
    if count <= SNIPPET_CHARS {
        text.to_string()
    } else {
        let mut s: String = text.chars().take(SNIPPET_CHARS).collect();
        s.push('…');
        s
    }
}

fn serde_err(message: String) -> crate::error::SessionError {
    use serde::de::Error;
    crate::error::SessionError::Serde(serde_json::Error::custom(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_schema_round_trips_without_migration() {
        let mut thread = Thread::new("Gradient descent");
        thread.messages.push(Message::now(Role::User, "What is gradient descent?"));
        let file = ThreadFile { version: SCHEMA_VERSION, threads: vec![thread.clone()] };

        let value = serde_json::to_value(&file).unwrap();
        let (parsed, migrated) = ThreadFile::from_value(value).unwrap();
        assert!(!migrated);
        assert_eq!(parsed.threads, vec![thread]);
    }

    #[test]
    fn flat_message_array_becomes_one_titled_thread() {
        let value = json!([
            { "role": "user", "content": "Explain a confusion matrix" },
            { "role": "assistant", "content": "A table of prediction outcomes." },
        ]);

        let (file, migrated) = ThreadFile::from_value(value).unwrap();
        assert!(migrated);
        assert_eq!(file.version, SCHEMA_VERSION);
        assert_eq!(file.threads.len(), 1);
        let thread = &file.threads[0];
        assert_eq!(thread.title, "Explain a confusion matrix");
        assert_eq!(thread.messages.len(), 2);
        assert_eq!(thread.messages[0].role, Role::User);
    }

    #[test]
    fn untagged_thread_array_is_adopted_as_is() {
        let thread = Thread::new("Old thread");
        let value = serde_json::to_value(vec![thread.clone()]).unwrap();

        let (file, migrated) = ThreadFile::from_value(value).unwrap();
        assert!(migrated);
        assert_eq!(file.threads, vec![thread]);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let value = json!({ "version": 2, "threads": [] });
        assert!(ThreadFile::from_value(value).is_err());
    }

    #[test]
    fn long_titles_are_clipped_with_an_ellipsis() {
        let prompt = "p".repeat(80);
        let title = derive_title(&prompt);
        assert_eq!(title.chars().count(), 61);
        assert!(title.ends_with('…'));
        assert_eq!(derive_title("   "), DEFAULT_TITLE);
    }
}
