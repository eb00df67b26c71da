// Application state module
// Holds the startup configuration and the reloadable site snapshot

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::{Config, SiteConfig};
use crate::handler::ErrorPageConfig;
use crate::provider::{ContentProvider, FsProvider};

/// Everything a request needs to serve the site
///
/// Requests clone the `Arc<Site>` and never hold the lock while serving.
pub struct Site {
    pub config: SiteConfig,
    /// From `server.error_page`; read from disk ahead of `config.error_page`
    pub error_page_override: Option<PathBuf>,
    pub provider: Arc<dyn ContentProvider>,
}

impl Site {
    pub fn from_config(config: &Config) -> Self {
        let site = config.site.clone();
        let provider = FsProvider::new(&site.root, site.index_files.clone());
        Self {
            error_page_override: config.server.error_page.as_ref().map(PathBuf::from),
            provider: Arc::new(provider),
            config: site,
        }
    }

    /// Use a different content provider (tests, embedded assets)
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ContentProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn error_page_config(&self) -> ErrorPageConfig {
        ErrorPageConfig {
            override_path: self.error_page_override.clone(),
            config_path: self.config.error_page.clone(),
        }
    }
}

/// Application state
pub struct AppState {
    pub config: Config,
    /// File the configuration was loaded from, re-read on reload
    pub config_path: String,
    site: RwLock<Arc<Site>>,
}

impl AppState {
    pub fn new(config: Config, config_path: impl Into<String>) -> Self {
        let site = Arc::new(Site::from_config(&config));
        Self {
            config,
            config_path: config_path.into(),
            site: RwLock::new(site),
        }
    }

    /// Current site snapshot
    pub async fn site(&self) -> Arc<Site> {
        Arc::clone(&*self.site.read().await)
    }

    pub async fn replace_site(&self, site: Site) {
        *self.site.write().await = Arc::new(site);
    }

    /// Re-read the configuration file and swap in a new site snapshot
    ///
    /// Server, logging and performance sections keep their startup values.
    pub async fn reload(&self) -> Result<(), config::ConfigError> {
        let fresh = Config::load_from(&self.config_path)?;
        let mut merged = self.config.clone();
        merged.site = fresh.site;
        merged.server.error_page = fresh.server.error_page;
        self.replace_site(Site::from_config(&merged)).await;
        Ok(())
    }
}
