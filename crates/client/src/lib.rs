//! Network capability for cachet.
//!
//! This crate provides the HTTP fetch client behind the [`Network`]
//! trait, plus URL canonicalization and the same-origin check the
//! interceptor relies on.

pub mod fetch;

pub use fetch::{FetchConfig, FetchError, FetchedResponse, HttpClient, Network};
pub use fetch::url::{UrlError, canonicalize, same_origin};
