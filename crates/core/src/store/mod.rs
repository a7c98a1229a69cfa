//! Versioned cache store for response snapshots.
//!
//! The store maps a request identity (method + canonical URL, hashed)
//! to an immutable response snapshot, grouped under named cache
//! generations. Exactly one generation is current at any time; stale
//! generations are deleted wholesale during activation.
//!
//! Two backends are provided:
//!
//! - [`SqliteStore`]: persistent, SQLite with WAL mode and schema
//!   migrations, async access via tokio-rusqlite
//! - [`MemoryStore`]: ephemeral, for tests and hosts without a disk

pub mod connection;
pub mod entry;
pub mod memory;
mod entries;
mod migrations;

use async_trait::async_trait;

use crate::Error;

pub use connection::SqliteStore;
pub use entry::{StoredResponse, request_key};
pub use memory::MemoryStore;

/// The store capability the worker runs against.
///
/// Entries are never mutated in place; `put` replaces the snapshot
/// wholesale. Per-key atomicity is the backend's responsibility.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the named cache if it does not exist yet.
    async fn ensure_cache(&self, name: &str) -> Result<(), Error>;

    /// Look up an entry in the named cache by request identity.
    async fn get(&self, cache: &str, key: &str) -> Result<Option<StoredResponse>, Error>;

    /// Insert or replace an entry. Creates the cache if absent.
    ///
    /// `url` is stored alongside the hashed key for inspection only;
    /// lookups go through the key.
    async fn put(&self, cache: &str, key: &str, url: &str, response: &StoredResponse) -> Result<(), Error>;

    /// Names of every cache generation currently in the store.
    async fn cache_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a cache generation and all its entries.
    ///
    /// Returns `true` if the cache existed.
    async fn delete_cache(&self, name: &str) -> Result<bool, Error>;

    /// Entry keys of the named cache.
    async fn entry_keys(&self, cache: &str) -> Result<Vec<String>, Error>;
}
