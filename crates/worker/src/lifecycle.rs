//! Install and activate transitions for the cache generation.

use cachet_core::store::request_key;
use cachet_core::Error;

use crate::worker::{Phase, Worker};

impl Worker {
    /// Install the current cache generation.
    ///
    /// Creates the generation's cache and pre-populates it by fetching
    /// every configured preload path. The preload is all-or-nothing:
    /// any fetch failure or non-success status aborts the install and
    /// drops the partial generation, so a rejected install leaves
    /// nothing servable. On success the worker is immediately ready to
    /// activate — there is no waiting phase.
    pub async fn on_install(&self) -> Result<(), Error> {
        let cache = &self.config.cache_version;
        tracing::info!(cache = %cache, "installing");

        self.store.ensure_cache(cache).await?;

        if let Err(e) = self.preload(cache).await {
            if let Err(drop_err) = self.store.delete_cache(cache).await {
                tracing::warn!(cache = %cache, error = %drop_err, "failed to drop partial cache");
            }
            return Err(e);
        }

        *self.phase.write().await = Phase::Installed;
        tracing::info!(cache = %cache, paths = self.config.preload_paths.len(), "install complete");
        Ok(())
    }

    async fn preload(&self, cache: &str) -> Result<(), Error> {
        for path in &self.config.preload_paths {
            let url = self.resource_url(path)?;
            let fetched = self
                .net
                .fetch(&url)
                .await
                .map_err(|e| Error::PreloadFailed { path: path.clone(), reason: e.to_string() })?;

            if !(200..300).contains(&fetched.status) {
                return Err(Error::PreloadFailed {
                    path: path.clone(),
                    reason: format!("status {}", fetched.status),
                });
            }

            let key = request_key("GET", url.as_str());
            self.store
                .put(cache, &key, url.as_str(), &fetched.into_stored())
                .await?;
            tracing::debug!(cache = %cache, path = %path, "preloaded");
        }
        Ok(())
    }

    /// Activate the current cache generation.
    ///
    /// Deletes every cache whose name differs from the current
    /// generation — including names this worker never created (kept
    /// from the original behavior; see DESIGN.md). Deletion is
    /// best-effort per name: a failure is logged and the remaining
    /// candidates are still attempted. Finally claims all active
    /// clients through the host so in-flight sessions come under this
    /// generation immediately.
    pub async fn on_activate(&self) -> Result<(), Error> {
        let current = &self.config.cache_version;
        tracing::info!(cache = %current, "activating");

        for name in self.store.cache_names().await? {
            if name == *current {
                continue;
            }
            match self.store.delete_cache(&name).await {
                Ok(_) => tracing::info!(cache = %name, "cleared stale cache"),
                Err(e) => tracing::warn!(cache = %name, error = %e, "failed to clear stale cache"),
            }
        }

        self.host.claim_clients();
        *self.phase.write().await = Phase::Active;
        tracing::info!(cache = %current, "activation complete");
        Ok(())
    }
}
