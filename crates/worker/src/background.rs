//! Background sync of the articles feed.
//!
//! On the configured sync tag, the articles document is re-fetched,
//! parsed and reserialized as JSON, and its cache entry overwritten
//! wholesale. Failures are logged and swallowed; the host reschedules
//! according to its own retry policy.

use cachet_core::store::request_key;
use cachet_core::{Error, StoredResponse};

use crate::worker::Worker;

/// Result of one sync invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The articles entry was refreshed.
    Synced,
    /// The tag is not one this worker answers to.
    UnknownTag,
    /// Fetch, parse, or store failed. Not retried here.
    Failed,
}

impl Worker {
    /// Handle a background sync trigger.
    pub async fn on_sync(&self, tag: &str) -> SyncOutcome {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return SyncOutcome::UnknownTag;
        }

        match self.sync_articles().await {
            Ok(()) => {
                tracing::info!(path = %self.config.articles_path, "articles synced");
                SyncOutcome::Synced
            }
            Err(e) => {
                tracing::warn!(error = %e, "sync failed");
                SyncOutcome::Failed
            }
        }
    }

    async fn sync_articles(&self) -> Result<(), Error> {
        let url = self.resource_url(&self.config.articles_path)?;
        let fetched = self
            .net
            .fetch(&url)
            .await
            .map_err(|e| Error::NetworkUnreachable(e.to_string()))?;

        if !(200..300).contains(&fetched.status) {
            return Err(Error::HttpError(format!("status {}", fetched.status)));
        }

        // parse-and-reserialize: the stored body is normalized JSON,
        // not the raw wire bytes
        let value: serde_json::Value = serde_json::from_slice(&fetched.bytes)
            .map_err(|e| Error::InvalidPayload(e.to_string()))?;
        let body = serde_json::to_vec(&value).map_err(|e| Error::InvalidPayload(e.to_string()))?;

        let snapshot = StoredResponse {
            status: 200,
            headers: vec![("content-type".into(), "application/json".into())],
            content_type: Some("application/json".into()),
            body,
            stored_at: chrono::Utc::now().to_rfc3339(),
        };

        let key = request_key("GET", url.as_str());
        self.store
            .put(&self.config.cache_version, &key, url.as_str(), &snapshot)
            .await
    }
}
