//! # stacks-session
//!
//! Per-user conversation persistence for the stacks library chatbot: each
//! user's threads live in one versioned JSON file, and a [`ThreadStore`]
//! provides the list/create/get/rename/delete/append operations the chat
//! surface needs. Legacy unversioned files are migrated once at load.

pub mod error;
pub mod store;
pub mod thread;

pub use error::{Result, SessionError};
pub use store::{ThreadStore, ThreadSummary};
pub use thread::{derive_title, Message, Thread, ThreadFile, DEFAULT_TITLE, SCHEMA_VERSION};
