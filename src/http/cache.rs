//! HTTP cache control module
//!
//! Resolves the `Cache-Control` header for a requested path from the site's
//! cache policy table.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// Header value used when the table says nothing about a path (one hour)
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=3600";

/// A single `cache_control` entry as written in configuration
///
/// ```toml
/// [site.cache_control]
/// "index.html" = 1000
/// "none.html" = false
/// "private.html" = "private, max-age=300"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CacheDirective {
    /// Public caching for this many seconds
    Seconds(u64),
    /// `false` disables caching; `true` keeps the default policy
    Enabled(bool),
    /// Literal header value
    Header(String),
}

/// Cache policy table: exact request path → directive
pub type CachePolicyTable = HashMap<String, CacheDirective>;

/// Cache control policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds)
    Public(u64),
    /// No cache
    NoCache,
    /// Header value taken verbatim from configuration
    Verbatim(String),
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn to_header_value(&self) -> Cow<'_, str> {
        match self {
            Self::Public(max_age) => Cow::Owned(format!("public, max-age={max_age}")),
            Self::NoCache => Cow::Borrowed("no-cache"),
            Self::Verbatim(value) => Cow::Borrowed(value),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Public(3600) // 1 hour
    }
}

impl From<&CacheDirective> for CachePolicy {
    fn from(directive: &CacheDirective) -> Self {
        match directive {
            CacheDirective::Seconds(seconds) => Self::Public(*seconds),
            CacheDirective::Enabled(false) => Self::NoCache,
            CacheDirective::Enabled(true) => Self::default(),
            CacheDirective::Header(value) => Self::Verbatim(value.clone()),
        }
    }
}

/// Find the policy for a requested path
///
/// Keys match the path verbatim (`/index.html`) or without its leading slash
/// (`index.html`); the verbatim key wins when both are configured.
pub fn policy_for(requested_path: &str, table: &CachePolicyTable) -> CachePolicy {
    table
        .get(requested_path)
        .or_else(|| {
            requested_path
                .strip_prefix('/')
                .and_then(|relative| table.get(relative))
        })
        .map_or_else(CachePolicy::default, CachePolicy::from)
}

/// Resolve the `Cache-Control` header value for a requested path
///
/// # Examples
/// ```
/// use static_responder::http::cache::{resolve_cache_control, CacheDirective, CachePolicyTable};
/// let mut table = CachePolicyTable::new();
/// table.insert("index.html".to_string(), CacheDirective::Seconds(1000));
/// assert_eq!(resolve_cache_control("/index.html", &table), "public, max-age=1000");
/// assert_eq!(resolve_cache_control("/other.html", &table), "public, max-age=3600");
/// ```
pub fn resolve_cache_control(requested_path: &str, table: &CachePolicyTable) -> String {
    policy_for(requested_path, table)
        .to_header_value()
        .into_owned()
}
