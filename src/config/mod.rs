// Configuration module entry point
// Loads the server configuration and manages the reloadable site state

mod state;
mod types;

use crate::http::CachePolicyTable;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// Re-export public types
pub use state::{AppState, Site};
pub use types::{
    Config, HealthConfig, LoggingConfig, PerformanceConfig, RedirectRule, ServerConfig, SiteConfig,
};

/// Configuration file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("RESPONDER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("site.root", "./public")?
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        if let Some(path) = toml_file(config_path) {
            config.apply_case_sensitive(&path)?;
        }
        Ok(config)
    }

    /// Re-read the keys whose case matters straight from the TOML file
    ///
    /// The `config` crate lowercases every key, which loses camelCase options
    /// such as `errorPage` and the request paths used as `cache_control` and
    /// `redirects` keys.
    fn apply_case_sensitive(&mut self, path: &Path) -> Result<(), config::ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
        let raw: CaseSensitiveKeys =
            toml::from_str(&text).map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

        // Environment overrides already landed in `self`; only fill gaps
        if self.server.error_page.is_none() {
            self.server.error_page = raw.server.error_page;
        }
        if self.site.error_page.is_none() {
            self.site.error_page = raw.site.error_page;
        }
        if let Some(cache_control) = raw.site.cache_control {
            self.site.cache_control = cache_control;
        }
        if let Some(redirects) = raw.site.redirects {
            self.site.redirects = redirects;
        }
        Ok(())
    }

    /// Load from the path given as the first CLI argument, or `config`
    pub fn load() -> Result<(Self, String), config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let config = Self::load_from(&path)?;
        Ok((config, path))
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Keys of the configuration file that must keep their case
#[derive(Debug, Default, Deserialize)]
struct CaseSensitiveKeys {
    #[serde(default)]
    server: ServerKeys,
    #[serde(default)]
    site: SiteKeys,
}

#[derive(Debug, Default, Deserialize)]
struct ServerKeys {
    #[serde(default, alias = "errorPage")]
    error_page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SiteKeys {
    #[serde(default, alias = "errorPage")]
    error_page: Option<String>,
    #[serde(default, alias = "cacheControl")]
    cache_control: Option<CachePolicyTable>,
    #[serde(default)]
    redirects: Option<HashMap<String, RedirectRule>>,
}

/// The TOML file `config::File::with_name` would pick for `config_path`
fn toml_file(config_path: &str) -> Option<PathBuf> {
    let path = Path::new(config_path);
    if path.extension().is_some_and(|ext| ext == "toml") && path.is_file() {
        return Some(path.to_path_buf());
    }
    let with_ext = PathBuf::from(format!("{config_path}.toml"));
    with_ext.is_file().then_some(with_ext)
}
