//! Client-local reader state: recently read posts and liked posts.
//!
//! Both lists are stored as JSON arrays of slugs behind a [`KeyValueStore`],
//! so a browser-like local storage, a file or plain memory can back them.

use std::collections::HashMap;

use crate::error::{BlogClientError, BlogClientResult};
use crate::non_empty_slug;

/// How many recently read slugs are kept.
pub const READ_HISTORY_LIMIT: usize = 20;

const READ_HISTORY_KEY: &str = "clinic_blog.read_history";
const LIKED_POSTS_KEY: &str = "clinic_blog.liked_posts";

/// Minimal string key/value storage.
pub trait KeyValueStore {
    /// Returns the stored value, if any.
    fn get(&self, key: &str) -> BlogClientResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> BlogClientResult<()>;
    /// Removes `key`; removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> BlogClientResult<()>;
}

#[derive(Debug, Clone, Default)]
/// In-memory [`KeyValueStore`].
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BlogClientResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> BlogClientResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> BlogClientResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A corrupt value reads as an empty list.
fn load_slugs(store: &impl KeyValueStore, key: &str) -> BlogClientResult<Vec<String>> {
    Ok(store
        .get(key)?
        .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
        .unwrap_or_default())
}

fn save_slugs(store: &mut impl KeyValueStore, key: &str, slugs: &[String]) -> BlogClientResult<()> {
    let raw = serde_json::to_string(slugs).map_err(|err| BlogClientError::Storage(err.to_string()))?;
    store.set(key, &raw)
}

/// Most-recent-first list of read posts, capped at [`READ_HISTORY_LIMIT`].
pub struct ReadHistory<'a, S: KeyValueStore> {
    store: &'a mut S,
}

impl<'a, S: KeyValueStore> ReadHistory<'a, S> {
    /// Wraps `store`.
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Moves `slug` to the front, dropping the oldest entry past the cap.
    pub fn record(&mut self, slug: &str) -> BlogClientResult<()> {
        let slug = non_empty_slug(slug)?;
        let mut slugs = load_slugs(self.store, READ_HISTORY_KEY)?;
        slugs.retain(|existing| existing != slug);
        slugs.insert(0, slug.to_string());
        slugs.truncate(READ_HISTORY_LIMIT);
        save_slugs(self.store, READ_HISTORY_KEY, &slugs)
    }

    /// Read slugs, most recent first.
    pub fn recent(&self) -> BlogClientResult<Vec<String>> {
        load_slugs(self.store, READ_HISTORY_KEY)
    }

    /// Forgets every entry.
    pub fn clear(&mut self) -> BlogClientResult<()> {
        self.store.remove(READ_HISTORY_KEY)
    }
}

/// Set of liked posts, in the order they were liked.
pub struct LikedPosts<'a, S: KeyValueStore> {
    store: &'a mut S,
}

impl<'a, S: KeyValueStore> LikedPosts<'a, S> {
    /// Wraps `store`.
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Likes or unlikes `slug`; returns whether it is liked afterwards.
    pub fn toggle(&mut self, slug: &str) -> BlogClientResult<bool> {
        let slug = non_empty_slug(slug)?;
        let mut slugs = load_slugs(self.store, LIKED_POSTS_KEY)?;
        let liked = if let Some(index) = slugs.iter().position(|existing| existing == slug) {
            slugs.remove(index);
            false
        } else {
            slugs.push(slug.to_string());
            true
        };
        save_slugs(self.store, LIKED_POSTS_KEY, &slugs)?;
        Ok(liked)
    }

    /// Whether `slug` is liked.
    pub fn is_liked(&self, slug: &str) -> BlogClientResult<bool> {
        Ok(load_slugs(self.store, LIKED_POSTS_KEY)?
            .iter()
            .any(|existing| existing == slug.trim()))
    }

    /// Every liked slug.
    pub fn all(&self) -> BlogClientResult<Vec<String>> {
        load_slugs(self.store, LIKED_POSTS_KEY)
    }
}
