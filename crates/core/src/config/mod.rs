//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CACHET_*)
//! 2. TOML config file (if CACHET_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CACHET_*)
/// 2. TOML config file (if CACHET_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Origin the worker controls. Requests outside this origin are
    /// never intercepted.
    ///
    /// Set via CACHET_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Name of the current cache generation. Exactly one generation is
    /// current at any time; activation evicts every other name.
    ///
    /// Set via CACHET_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Paths pre-populated into the cache at install time, in order.
    ///
    /// Set via CACHET_PRELOAD_PATHS environment variable (comma-separated).
    #[serde(default = "default_preload_paths")]
    pub preload_paths: Vec<String>,

    /// Path served from the cache when a network fetch fails.
    ///
    /// Set via CACHET_OFFLINE_FALLBACK_PATH environment variable.
    #[serde(default = "default_offline_fallback_path")]
    pub offline_fallback_path: String,

    /// Path to the SQLite cache database.
    ///
    /// Set via CACHET_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via CACHET_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via CACHET_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via CACHET_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Background sync tag this worker answers to.
    ///
    /// Set via CACHET_SYNC_TAG environment variable.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Path refreshed by the background sync task.
    ///
    /// Set via CACHET_ARTICLES_PATH environment variable.
    #[serde(default = "default_articles_path")]
    pub articles_path: String,

    /// Fixed metadata for push notifications.
    ///
    /// Set via CACHET_NOTIFICATION__* environment variables.
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Fixed notification metadata attached to every push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Notification title.
    #[serde(default = "default_notification_title")]
    pub title: String,

    /// Body used when a push carries no payload.
    #[serde(default = "default_notification_body")]
    pub default_body: String,

    /// Icon path.
    #[serde(default = "default_notification_icon")]
    pub icon: String,

    /// Badge path.
    #[serde(default = "default_notification_icon")]
    pub badge: String,

    /// Notification tag for coalescing.
    #[serde(default = "default_notification_tag")]
    pub tag: String,
}

fn default_origin() -> String {
    "https://mycitynews.ca".into()
}

fn default_cache_version() -> String {
    "mycitynews-v1".into()
}

fn default_preload_paths() -> Vec<String> {
    vec![
        "/".into(),
        "/index.html".into(),
        "/ad-redirect.html".into(),
        "/articles.json".into(),
        "/manifest.json".into(),
    ]
}

fn default_offline_fallback_path() -> String {
    "/index.html".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./cachet-cache.sqlite")
}

fn default_user_agent() -> String {
    "cachet/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_sync_tag() -> String {
    "sync-articles".into()
}

fn default_articles_path() -> String {
    "/articles.json".into()
}

fn default_notification_title() -> String {
    "MyCityNews.ca".into()
}

fn default_notification_body() -> String {
    "New articles available!".into()
}

fn default_notification_icon() -> String {
    "/icon-192.png".into()
}

fn default_notification_tag() -> String {
    "news-notification".into()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            default_body: default_notification_body(),
            icon: default_notification_icon(),
            badge: default_notification_icon(),
            tag: default_notification_tag(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_version: default_cache_version(),
            preload_paths: default_preload_paths(),
            offline_fallback_path: default_offline_fallback_path(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            sync_tag: default_sync_tag(),
            articles_path: default_articles_path(),
            notification: NotificationConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CACHET_`
    /// 2. TOML file from `CACHET_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CACHET_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CACHET_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert_eq!(config.origin, "https://mycitynews.ca");
        assert_eq!(config.cache_version, "mycitynews-v1");
        assert_eq!(config.preload_paths.len(), 5);
        assert_eq!(config.preload_paths[0], "/");
        assert_eq!(config.offline_fallback_path, "/index.html");
        assert_eq!(config.db_path, PathBuf::from("./cachet-cache.sqlite"));
        assert_eq!(config.user_agent, "cachet/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.sync_tag, "sync-articles");
        assert_eq!(config.articles_path, "/articles.json");
    }

    #[test]
    fn test_default_notification_metadata() {
        let config = WorkerConfig::default();
        assert_eq!(config.notification.title, "MyCityNews.ca");
        assert_eq!(config.notification.default_body, "New articles available!");
        assert_eq!(config.notification.icon, "/icon-192.png");
        assert_eq!(config.notification.badge, "/icon-192.png");
        assert_eq!(config.notification.tag, "news-notification");
    }

    #[test]
    fn test_timeout_duration() {
        let config = WorkerConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_layered_loading_precedence() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "cachet.toml",
                r#"
                    cache_version = "from-file-v2"
                    user_agent = "from-file/1.0"
                "#,
            )?;
            jail.set_env("CACHET_CONFIG_FILE", "cachet.toml");
            jail.set_env("CACHET_CACHE_VERSION", "from-env-v3");
            jail.set_env("CACHET_TIMEOUT_MS", "30000");

            let config = WorkerConfig::load().expect("layered load");

            // env beats file
            assert_eq!(config.cache_version, "from-env-v3");
            // file beats defaults
            assert_eq!(config.user_agent, "from-file/1.0");
            // env beats defaults
            assert_eq!(config.timeout_ms, 30_000);
            // untouched fields keep their defaults
            assert_eq!(config.sync_tag, "sync-articles");
            assert_eq!(config.preload_paths.len(), 5);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_env_value() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CACHET_TIMEOUT_MS", "50");
            let result = WorkerConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
            Ok(())
        });
    }

    #[test]
    fn test_articles_path_is_preloaded() {
        // The sync target must also be part of the install preload set
        // so the entry it overwrites exists from the first activation.
        let config = WorkerConfig::default();
        assert!(config.preload_paths.contains(&config.articles_path));
    }
}
