//! JSON-file thread persistence, one file per user.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use stacks_chat::Role;

use crate::error::{Result, SessionError};
use crate::thread::{derive_title, Message, Thread, ThreadFile, DEFAULT_TITLE};

/// A thread listing entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadSummary {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    /// Short excerpt of the latest message.
    pub preview: String,
}

/// Stores each user's threads in one JSON file under a root directory.
///
/// Reads migrate legacy file shapes once and rewrite the file. Writes go
/// through a temp file and rename, so a crash mid-write leaves the previous
/// file intact. Two processes writing the same user's file can still lose
/// one writer's update; the store assumes one process per deployment.
pub struct ThreadStore {
    root: PathBuf,
}

impl ThreadStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// List a user's threads, most recently updated first.
    pub fn list(&self, user: &str) -> Result<Vec<ThreadSummary>> {
        let file = self.load(user)?;
        let mut summaries: Vec<ThreadSummary> = file
            .threads
            .iter()
            .map(|t| ThreadSummary {
                id: t.id.clone(),
                title: t.title.clone(),
                updated_at: t.updated_at,
                preview: t.preview(),
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Create a new empty thread.
    ///
    /// With no explicit title the thread starts as [`DEFAULT_TITLE`] and is
    /// renamed from the opening prompt by [`ThreadStore::append_exchange`].
    pub fn create(&self, user: &str, title: Option<&str>) -> Result<Thread> {
        let mut file = self.load(user)?;
        let thread = Thread::new(title.unwrap_or(DEFAULT_TITLE));
        file.threads.push(thread.clone());
        self.save(user, &file)?;
        info!(user, thread_id = %thread.id, "created thread");
        Ok(thread)
    }

    /// Fetch one thread by id.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ThreadNotFound`] if the id is unknown.
    pub fn get(&self, user: &str, thread_id: &str) -> Result<Thread> {
        let file = self.load(user)?;
        file.threads
            .into_iter()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| SessionError::ThreadNotFound(thread_id.to_string()))
    }

    /// Rename a thread.
    pub fn rename(&self, user: &str, thread_id: &str, title: &str) -> Result<()> {
        self.update(user, thread_id, |thread| {
            thread.title = title.to_string();
        })
        .map(|_| ())
    }

    /// Delete a thread.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ThreadNotFound`] if the id is unknown.
    pub fn delete(&self, user: &str, thread_id: &str) -> Result<()> {
        let mut file = self.load(user)?;
        let before = file.threads.len();
        file.threads.retain(|t| t.id != thread_id);
        if file.threads.len() == before {
            return Err(SessionError::ThreadNotFound(thread_id.to_string()));
        }
        self.save(user, &file)?;
        info!(user, thread_id, "deleted thread");
        Ok(())
    }

    /// Append one user/assistant exchange to a thread.
    ///
    /// A thread that was empty and still default-titled is titled from the
    /// user prompt. Returns the updated thread.
    pub fn append_exchange(
        &self,
        user: &str,
        thread_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<Thread> {
        self.update(user, thread_id, |thread| {
            if thread.messages.is_empty() && thread.title == DEFAULT_TITLE {
                thread.title = derive_title(user_text);
            }
            thread.messages.push(Message::now(Role::User, user_text));
            thread.messages.push(Message::now(Role::Assistant, assistant_text));
        })
    }

    /// Delete all of a user's threads.
    ///
    /// A user with no thread file is already clear; this is not an error.
    pub fn clear(&self, user: &str) -> Result<()> {
        let path = self.user_path(user);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(user, "cleared all threads");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn update(
        &self,
        user: &str,
        thread_id: &str,
        apply: impl FnOnce(&mut Thread),
    ) -> Result<Thread> {
        let mut file = self.load(user)?;
        let thread = file
            .threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| SessionError::ThreadNotFound(thread_id.to_string()))?;
        apply(thread);
        thread.updated_at = Utc::now();
        let updated = thread.clone();
        self.save(user, &file)?;
        Ok(updated)
    }

    fn load(&self, user: &str) -> Result<ThreadFile> {
        let path = self.user_path(user);
        if !path.exists() {
            return Ok(ThreadFile::empty());
        }
        let raw = fs::read_to_string(&path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let (file, migrated) = ThreadFile::from_value(value)?;
        if migrated {
            // Rewrite once so the legacy shape is never parsed again.
            info!(user, "rewriting thread file at current schema");
            self.save(user, &file)?;
        }
        Ok(file)
    }

    fn save(&self, user: &str, file: &ThreadFile) -> Result<()> {
        let path = self.user_path(user);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(file)?)?;
        fs::rename(&tmp, &path)?;
        debug!(user, thread_count = file.threads.len(), "saved thread file");
        Ok(())
    }

    fn user_path(&self, user: &str) -> PathBuf {
        // Usernames become file names; anything path-hostile is replaced.
        let safe: String = user
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Path::new(&self.root).join(format!("{safe}.json"))
    }
}
