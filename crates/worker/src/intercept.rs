//! Cache-first request interception.
//!
//! Per request: same-origin gate, then cache lookup, then network with
//! a detached cache write, then the offline fallback. Exactly one
//! terminal outcome per cycle, and nothing is returned before either
//! the lookup or the network attempt has definitively resolved.

use cachet_client::{canonicalize, same_origin, FetchedResponse};
use cachet_core::store::request_key;
use cachet_core::{Error, StoredResponse};

use crate::worker::Worker;

/// Terminal outcome of one interception cycle.
#[derive(Debug)]
pub enum InterceptOutcome {
    /// Not same-origin; the host's default handling applies.
    Passthrough,
    /// Served verbatim from the cache. No network call was made.
    Hit(StoredResponse),
    /// Served from the network. Cacheable responses are being written
    /// to the store by a detached task; the caller does not wait.
    Fetched(FetchedResponse),
    /// Network failed; the configured fallback document was served
    /// from the cache instead.
    OfflineFallback(StoredResponse),
    /// Network failed and no fallback entry exists. The host surfaces
    /// the network error.
    Unresolved,
}

impl Worker {
    /// Intercept a GET request for the given URL.
    ///
    /// The post-fetch store write is fire-and-forget: its errors are
    /// logged at debug level and discarded, and the write may still be
    /// in flight when this returns.
    pub async fn intercept(&self, raw_url: &str) -> Result<InterceptOutcome, Error> {
        let url = canonicalize(raw_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        if !same_origin(&self.origin, &url) {
            tracing::debug!(url = %url, "cross-origin request, not intercepting");
            return Ok(InterceptOutcome::Passthrough);
        }

        let cache = &self.config.cache_version;
        let key = request_key("GET", url.as_str());

        if let Some(stored) = self.store.get(cache, &key).await? {
            tracing::debug!(url = %url, "cache hit");
            return Ok(InterceptOutcome::Hit(stored));
        }

        match self.net.fetch(&url).await {
            Ok(response) => {
                if response.is_cacheable() {
                    let store = self.store.clone();
                    let cache = cache.clone();
                    let entry_url = url.to_string();
                    let snapshot = response.clone().into_stored();
                    tokio::spawn(async move {
                        if let Err(e) = store.put(&cache, &key, &entry_url, &snapshot).await {
                            tracing::debug!(url = %entry_url, error = %e, "detached cache write dropped");
                        }
                    });
                }
                Ok(InterceptOutcome::Fetched(response))
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "network failed, trying offline fallback");
                let fallback_url = self.resource_url(&self.config.offline_fallback_path)?;
                let fallback_key = request_key("GET", fallback_url.as_str());
                match self.store.get(cache, &fallback_key).await? {
                    Some(stored) => Ok(InterceptOutcome::OfflineFallback(stored)),
                    None => Ok(InterceptOutcome::Unresolved),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cachet_core::CacheStore;

    use super::*;
    use crate::testutil::{preloaded_net, rig, wait_for_entry, MockNet};

    const CACHE: &str = "mycitynews-v1";

    #[tokio::test]
    async fn test_cross_origin_is_passed_through() {
        let rig = rig(MockNet::new());

        let outcome = rig.worker.intercept("https://ads.example.com/banner.js").await.unwrap();

        assert!(matches!(outcome, InterceptOutcome::Passthrough));
        // neither the store nor the network was touched
        assert!(rig.net.calls().is_empty());
        assert!(rig.store.cache_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let rig = rig(preloaded_net());
        rig.worker.on_install().await.unwrap();
        let installed_calls = rig.net.calls().len();

        let outcome = rig.worker.intercept("https://mycitynews.ca/index.html").await.unwrap();

        let InterceptOutcome::Hit(stored) = outcome else {
            panic!("expected cache hit");
        };
        assert_eq!(stored.body_text(), "<html>index</html>");
        assert_eq!(stored.status, 200);
        assert_eq!(rig.net.calls().len(), installed_calls);
    }

    #[tokio::test]
    async fn test_hit_returns_stored_snapshot_verbatim() {
        let rig = rig(MockNet::new());
        let key = request_key("GET", "https://mycitynews.ca/pinned.html");
        let snapshot = StoredResponse {
            status: 200,
            headers: vec![("x-custom".into(), "yes".into())],
            content_type: Some("text/html".into()),
            body: b"pinned".to_vec(),
            stored_at: "2025-01-01T00:00:00Z".into(),
        };
        rig.store
            .put(CACHE, &key, "https://mycitynews.ca/pinned.html", &snapshot)
            .await
            .unwrap();

        let outcome = rig.worker.intercept("https://mycitynews.ca/pinned.html").await.unwrap();

        let InterceptOutcome::Hit(stored) = outcome else {
            panic!("expected cache hit");
        };
        assert_eq!(stored, snapshot);
    }

    #[tokio::test]
    async fn test_miss_fetches_and_caches() {
        let net = MockNet::new();
        net.ok("https://mycitynews.ca/late.html", b"<html>late</html>");
        let rig = rig(net);

        let outcome = rig.worker.intercept("https://mycitynews.ca/late.html").await.unwrap();

        let InterceptOutcome::Fetched(response) = outcome else {
            panic!("expected network response");
        };
        assert_eq!(response.status, 200);
        assert_eq!(&response.bytes[..], b"<html>late</html>");

        // the detached write lands after the response is already out
        let key = request_key("GET", "https://mycitynews.ca/late.html");
        let entry = wait_for_entry(&rig.store, CACHE, &key).await.expect("detached write landed");
        assert_eq!(entry.body_text(), "<html>late</html>");
    }

    #[tokio::test]
    async fn test_non_200_is_returned_uncached() {
        let net = MockNet::new();
        net.status("https://mycitynews.ca/gone.html", 404, b"not found");
        let rig = rig(net);

        let outcome = rig.worker.intercept("https://mycitynews.ca/gone.html").await.unwrap();

        let InterceptOutcome::Fetched(response) = outcome else {
            panic!("expected network response");
        };
        assert_eq!(response.status, 404);

        tokio::task::yield_now().await;
        let key = request_key("GET", "https://mycitynews.ca/gone.html");
        assert!(rig.store.get(CACHE, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redirected_response_is_returned_uncached() {
        let net = MockNet::new();
        net.moved("https://mycitynews.ca/old", "https://mycitynews.ca/new");
        let rig = rig(net);

        let outcome = rig.worker.intercept("https://mycitynews.ca/old").await.unwrap();

        let InterceptOutcome::Fetched(response) = outcome else {
            panic!("expected network response");
        };
        assert!(response.redirected());

        tokio::task::yield_now().await;
        let key = request_key("GET", "https://mycitynews.ca/old");
        assert!(rig.store.get(CACHE, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_network_failure_serves_offline_fallback() {
        let rig = rig(preloaded_net());
        rig.worker.on_install().await.unwrap();
        // /fresh-news.html was never cached and the network is now down

        let outcome = rig.worker.intercept("https://mycitynews.ca/fresh-news.html").await.unwrap();

        let InterceptOutcome::OfflineFallback(stored) = outcome else {
            panic!("expected offline fallback");
        };
        assert_eq!(stored.body_text(), "<html>index</html>");
    }

    #[tokio::test]
    async fn test_network_failure_without_fallback_is_unresolved() {
        // nothing installed, nothing routed: fully offline, empty cache
        let rig = rig(MockNet::new());

        let outcome = rig.worker.intercept("https://mycitynews.ca/anything.html").await.unwrap();

        assert!(matches!(outcome, InterceptOutcome::Unresolved));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let rig = rig(MockNet::new());
        let result = rig.worker.intercept("").await;
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
