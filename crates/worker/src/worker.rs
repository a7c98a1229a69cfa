//! The worker itself: construction, phase tracking, shared helpers.
//!
//! Lifecycle methods live in `lifecycle`, the fetch path in
//! `intercept`, background sync in `background`, and notification
//! plumbing in `notify`; they are all impl blocks on [`Worker`].

use std::sync::Arc;

use cachet_client::Network;
use cachet_core::{CacheStore, Error, WorkerConfig};
use tokio::sync::RwLock;
use url::Url;

use crate::host::Host;

/// Worker lifecycle phases.
///
/// There is no waiting phase: a successful install immediately makes
/// the worker eligible for activation, superseding any previous
/// generation without waiting for its consumers to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not yet installed.
    Idle,
    /// Preload complete, ready to activate.
    Installed,
    /// Current generation, controlling all clients.
    Active,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Installed => write!(f, "installed"),
            Phase::Active => write!(f, "active"),
        }
    }
}

/// Offline cache worker for one origin.
///
/// Owns the install/activate lifecycle of a named cache generation,
/// intercepts requests cache-first, and handles background sync and
/// push notification shaping for the host.
pub struct Worker {
    pub(crate) config: WorkerConfig,
    pub(crate) origin: Url,
    pub(crate) store: Arc<dyn CacheStore>,
    pub(crate) net: Arc<dyn Network>,
    pub(crate) host: Arc<dyn Host>,
    pub(crate) phase: RwLock<Phase>,
}

impl Worker {
    /// Build a worker over the given store, network, and host.
    ///
    /// The configured origin must be a valid absolute URL; everything
    /// the worker touches is resolved against it.
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn CacheStore>,
        net: Arc<dyn Network>,
        host: Arc<dyn Host>,
    ) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;
        Ok(Self { config, origin, store, net, host, phase: RwLock::new(Phase::Idle) })
    }

    /// The loaded configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> Phase {
        *self.phase.read().await
    }

    /// Resolve a site-relative path against the origin.
    pub(crate) fn resource_url(&self, path: &str) -> Result<Url, Error> {
        self.origin
            .join(path)
            .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
    }
}
