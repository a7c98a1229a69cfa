//! Core types and shared functionality for cachet.
//!
//! This crate provides:
//! - The versioned cache store (trait + SQLite and in-memory backends)
//! - Unified error types
//! - Worker configuration

pub mod config;
pub mod error;
pub mod store;

pub use config::WorkerConfig;
pub use error::Error;
pub use store::{CacheStore, MemoryStore, SqliteStore, StoredResponse};
