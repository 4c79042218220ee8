//! Thread store behavior against real files.

use stacks_session::{SessionError, ThreadStore, DEFAULT_TITLE, SCHEMA_VERSION};
use tempfile::TempDir;

fn store() -> (TempDir, ThreadStore) {
    let dir = TempDir::new().unwrap();
    let store = ThreadStore::new(dir.path()).unwrap();
    (dir, store)
}

#[test]
fn unknown_user_has_no_threads() {
    let (_dir, store) = store();
    assert!(store.list("alice").unwrap().is_empty());
}

#[test]
fn created_thread_round_trips_through_the_file() {
    let (_dir, store) = store();
    let thread = store.create("alice", Some("Regression basics")).unwrap();

    let fetched = store.get("alice", &thread.id).unwrap();
    assert_eq!(fetched.title, "Regression basics");
    assert!(fetched.messages.is_empty());
}

#[test]
fn append_exchange_titles_an_untitled_thread_from_the_prompt() {
    let (_dir, store) = store();
    let thread = store.create("alice", None).unwrap();
    assert_eq!(thread.title, DEFAULT_TITLE);

    let updated = store
        .append_exchange(
            "alice",
            &thread.id,
            "What is overfitting?",
            "Fitting noise instead of signal.",
        )
        .unwrap();

    assert_eq!(updated.title, "What is overfitting?");
    assert_eq!(updated.messages.len(), 2);

    // An explicit title is never overwritten.
    let named = store.create("alice", Some("Named")).unwrap();
    let named = store.append_exchange("alice", &named.id, "hello", "hi").unwrap();
    assert_eq!(named.title, "Named");
}

#[test]
fn listing_orders_by_most_recent_update() {
    let (_dir, store) = store();
    let first = store.create("alice", Some("first")).unwrap();
    let second = store.create("alice", Some("second")).unwrap();

    store.append_exchange("alice", &first.id, "bump", "ok").unwrap();

    let summaries = store.list("alice").unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, first.id);
    assert_eq!(summaries[0].preview, "ok");
    assert_eq!(summaries[1].id, second.id);
}

#[test]
fn rename_and_delete() {
    let (_dir, store) = store();
    let thread = store.create("alice", Some("old")).unwrap();

    store.rename("alice", &thread.id, "new").unwrap();
    assert_eq!(store.get("alice", &thread.id).unwrap().title, "new");

    store.delete("alice", &thread.id).unwrap();
    assert!(matches!(
        store.get("alice", &thread.id),
        Err(SessionError::ThreadNotFound(_))
    ));
    assert!(matches!(
        store.delete("alice", &thread.id),
        Err(SessionError::ThreadNotFound(_))
    ));
}

#[test]
fn clear_removes_every_thread_for_one_user() {
    let (_dir, store) = store();
    store.create("alice", Some("first")).unwrap();
    store.create("alice", Some("second")).unwrap();
    let kept = store.create("bob", Some("keep")).unwrap();

    store.clear("alice").unwrap();
    assert!(store.list("alice").unwrap().is_empty());
    assert_eq!(store.list("bob").unwrap().len(), 1);
    assert_eq!(store.get("bob", &kept.id).unwrap().title, "keep");

    // Clearing an already-empty user is a no-op.
    store.clear("alice").unwrap();
    store.clear("nobody").unwrap();
}

#[test]
fn users_are_isolated_from_each_other() {
    let (_dir, store) = store();
    let thread = store.create("alice", Some("mine")).unwrap();

    assert!(store.list("bob").unwrap().is_empty());
    assert!(store.get("bob", &thread.id).is_err());
}

#[test]
fn legacy_flat_history_is_migrated_and_rewritten_once() {
    let dir = TempDir::new().unwrap();
    let legacy = serde_json::json!([
        { "role": "user", "content": "Explain k-means clustering" },
        { "role": "assistant", "content": "It partitions points into k groups." },
    ]);
    std::fs::write(dir.path().join("alice.json"), legacy.to_string()).unwrap();

    let store = ThreadStore::new(dir.path()).unwrap();
    let summaries = store.list("alice").unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].title, "Explain k-means clustering");

    // The file on disk is now at the current schema.
    let raw = std::fs::read_to_string(dir.path().join("alice.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], SCHEMA_VERSION);
    assert_eq!(value["threads"].as_array().unwrap().len(), 1);
}

#[test]
fn hostile_usernames_stay_inside_the_store_directory() {
    let (dir, store) = store();
    store.create("../escape", Some("t")).unwrap();

    assert!(!dir.path().parent().unwrap().join("escape.json").exists());
    assert_eq!(store.list("../escape").unwrap().len(), 1);
}
