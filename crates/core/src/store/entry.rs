//! Response snapshots and request-identity keys.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An immutable captured response.
///
/// Snapshots are taken at write time and returned verbatim on a cache
/// hit; they are only ever replaced wholesale, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// HTTP status at capture time.
    pub status: u16,
    /// Response headers at capture time, in wire order.
    pub headers: Vec<(String, String)>,
    /// Content-Type header, extracted for convenience.
    pub content_type: Option<String>,
    /// Body bytes.
    pub body: Vec<u8>,
    /// RFC3339 timestamp of the capture.
    pub stored_at: String,
}

impl StoredResponse {
    /// Body interpreted as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Compute the cache key for a request identity.
///
/// The identity is the HTTP method plus the canonical URL. The method
/// is normalized to uppercase so `get` and `GET` key identically.
pub fn request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
