// Configuration types module
// Defines all configuration-related data structures

use crate::http::CachePolicyTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Error page read from disk ahead of the site's own page
    #[serde(default, alias = "errorPage")]
    pub error_page: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `static_responder=debug`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Site configuration, reloadable at runtime
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Document root
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    /// Logical path of the site's not-found page
    #[serde(default, alias = "errorPage")]
    pub error_page: Option<String>,
    /// Per-path Cache-Control directives
    #[serde(default, alias = "cacheControl")]
    pub cache_control: CachePolicyTable,
    #[serde(default)]
    pub redirects: HashMap<String, RedirectRule>,
    #[serde(default)]
    pub health: HealthConfig,
}

#[allow(clippy::missing_const_for_fn)]
fn default_root() -> String {
    "./public".to_string()
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            index_files: default_index_files(),
            error_page: None,
            cache_control: CachePolicyTable::new(),
            redirects: HashMap::new(),
            health: HealthConfig::default(),
        }
    }
}

/// Redirect target for an exact request path
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    pub target: String,
    #[serde(default = "default_redirect_code")]
    pub code: u16,
}

#[allow(clippy::missing_const_for_fn)]
fn default_redirect_code() -> u16 {
    301
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

impl HealthConfig {
    pub fn is_probe(&self, path: &str) -> bool {
        self.enabled && (path == self.liveness_path || path == self.readiness_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::CacheDirective;

    #[test]
    fn test_site_defaults() {
        let site: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(site.root, "./public");
        assert_eq!(site.index_files, vec!["index.html", "index.htm"]);
        assert!(site.cache_control.is_empty());
        assert!(site.health.enabled);
    }

    #[test]
    fn test_site_tables() {
        let site: SiteConfig = toml::from_str(
            r#"
            root = "/srv/www"
            errorPage = "/404.html"

            [cache_control]
            "/index.html" = 1000
            "app.js" = false
            "/style.css" = "private, max-age=300"

            [redirects]
            "/old" = { target = "/new" }
            "/moved" = { target = "https://example.com/", code = 302 }
            "#,
        )
        .unwrap();

        assert_eq!(site.error_page.as_deref(), Some("/404.html"));
        assert_eq!(
            site.cache_control["/index.html"],
            CacheDirective::Seconds(1000)
        );
        assert_eq!(site.cache_control["app.js"], CacheDirective::Enabled(false));
        assert_eq!(site.redirects["/old"].code, 301);
        assert_eq!(site.redirects["/moved"].code, 302);
    }

    #[test]
    fn test_server_error_page_alias() {
        let server: ServerConfig = toml::from_str(
            r#"
            host = "127.0.0.1"
            port = 8080
            errorPage = "/var/www/custom-404.html"
            "#,
        )
        .unwrap();
        assert_eq!(
            server.error_page.as_deref(),
            Some("/var/www/custom-404.html")
        );
        assert!(server.workers.is_none());
    }

    #[test]
    fn test_health_probe_matching() {
        let mut health = HealthConfig::default();
        assert!(health.is_probe("/healthz"));
        assert!(health.is_probe("/readyz"));
        assert!(!health.is_probe("/index.html"));
        health.enabled = false;
        assert!(!health.is_probe("/healthz"));
    }
}
