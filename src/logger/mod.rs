//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error page and not-found diagnostics
//!
//! Everything goes through `tracing`; `init` installs the subscriber.

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::fmt::Display;
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Target used for access log lines, so they can be filtered separately
pub const ACCESS_TARGET: &str = "access";

/// Initialize the logger with configuration
///
/// Should be called once at application startup. `RUST_LOG` wins over
/// `logging.level` when set.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let console_layer = fmt::layer().with_target(true).with_filter(filter);

    let file_layer = match config.log_file.as_deref() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let filter = EnvFilter::try_new(&config.level)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Static responder started, listening on http://{addr}");
    tracing::info!("Document root: {}", config.site.root);
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
    if let Some(ref path) = config.server.error_page {
        tracing::info!("Error page override: {path}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_not_found(path: &str, err: &impl Display) {
    tracing::debug!(path, "not found: {err}");
}

/// A candidate error page could not be read; the next one is tried
pub fn log_error_page_fallback(source: &str, path: &str, err: &impl Display) {
    tracing::warn!(source, path, "error page unavailable, falling back: {err}");
}

pub fn log_config_reloaded(path: &str) {
    tracing::info!("Configuration reloaded from {path}");
}

pub fn log_shutdown(reason: &str) {
    tracing::info!("Shutting down: {reason}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
