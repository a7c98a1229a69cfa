//! cachet worker entry point.
//!
//! A standalone host adapter: loads configuration, opens the SQLite
//! store, and drives the worker through install and activate. Set
//! CACHET_SYNC_ON_START=1 to also run one articles sync pass.
//! Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::Result;
use cachet_client::{FetchConfig, HttpClient};
use cachet_core::{SqliteStore, WorkerConfig};
use tracing_subscriber::EnvFilter;

mod background;
mod host;
mod intercept;
mod lifecycle;
mod notify;
mod worker;

#[cfg(test)]
mod testutil;

use host::NullHost;
use worker::Worker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = WorkerConfig::load()?;
    tracing::info!(origin = %config.origin, cache = %config.cache_version, "starting cachet worker");

    let store = SqliteStore::open(&config.db_path).await?;
    let net = HttpClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
    })?;

    let sync_tag = config.sync_tag.clone();
    let worker = Worker::new(config, Arc::new(store), Arc::new(net), Arc::new(NullHost))?;

    worker.on_install().await?;
    worker.on_activate().await?;

    if matches!(
        std::env::var("CACHET_SYNC_ON_START").as_deref(),
        Ok("1") | Ok("true")
    ) {
        worker.on_sync(&sync_tag).await;
    }

    tracing::info!(phase = %worker.phase().await, "worker ready");
    Ok(())
}
