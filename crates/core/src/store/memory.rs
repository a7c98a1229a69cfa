//! Ephemeral in-memory store backend.
//!
//! Backs worker tests and hosts that do not persist across restarts.
//! Same contract as the SQLite backend: named caches over keyed
//! snapshots, deletion takes the whole generation with it.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::entry::StoredResponse;
use super::CacheStore;
use crate::Error;

#[derive(Debug, Clone)]
struct MemEntry {
    url: String,
    response: StoredResponse,
    stored_order: u64,
}

/// In-memory cache store. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    caches: BTreeMap<String, BTreeMap<String, MemEntry>>,
    next_order: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn ensure_cache(&self, name: &str) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        inner.caches.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn get(&self, cache: &str, key: &str) -> Result<Option<StoredResponse>, Error> {
        let inner = self.inner.read().await;
        Ok(inner
            .caches
            .get(cache)
            .and_then(|entries| entries.get(key))
            .map(|entry| entry.response.clone()))
    }

    async fn put(&self, cache: &str, key: &str, url: &str, response: &StoredResponse) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        let order = inner.next_order;
        inner.next_order += 1;
        inner.caches.entry(cache.to_string()).or_default().insert(
            key.to_string(),
            MemEntry { url: url.to_string(), response: response.clone(), stored_order: order },
        );
        Ok(())
    }

    async fn cache_names(&self) -> Result<Vec<String>, Error> {
        let inner = self.inner.read().await;
        Ok(inner.caches.keys().cloned().collect())
    }

    async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        let mut inner = self.inner.write().await;
        Ok(inner.caches.remove(name).is_some())
    }

    async fn entry_keys(&self, cache: &str) -> Result<Vec<String>, Error> {
        let inner = self.inner.read().await;
        let Some(entries) = inner.caches.get(cache) else {
            return Ok(Vec::new());
        };
        let mut keyed: Vec<(&String, u64)> = entries.iter().map(|(k, e)| (k, e.stored_order)).collect();
        keyed.sort_by_key(|(_, order)| *order);
        Ok(keyed.into_iter().map(|(k, _)| k.clone()).collect())
    }
}

impl MemoryStore {
    /// Stored URL for an entry, for inspection in tests and logs.
    pub async fn entry_url(&self, cache: &str, key: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner
            .caches
            .get(cache)
            .and_then(|entries| entries.get(key))
            .map(|entry| entry.url.clone())
    }
}
