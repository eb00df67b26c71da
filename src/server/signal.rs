// Signal handling module (nginx-style)
//
// Supported signals:
// - SIGHUP:  Reload the site configuration
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::AppState;
use crate::logger;

/// Shutdown coordination shared by the accept loop and the signal task
pub struct SignalHandler {
    shutdown: Notify,
    shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Notify::new(),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Mark shutdown and wake the accept loop
    pub fn request_shutdown(&self, reason: &str) {
        if !self.shutdown_requested.swap(true, Ordering::SeqCst) {
            logger::log_shutdown(reason);
        }
        self.shutdown.notify_one();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Resolves once shutdown has been requested
    pub async fn wait_for_shutdown(&self) {
        if self.is_shutdown_requested() {
            return;
        }
        self.shutdown.notified().await;
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Reload the site and log the outcome
pub async fn reload_site(state: &AppState) {
    match state.reload().await {
        Ok(()) => logger::log_config_reloaded(&state.config_path),
        Err(e) => logger::log_error(&format!(
            "Failed to reload configuration from {}: {e}; keeping the current site",
            state.config_path
        )),
    }
}

/// Start signal handlers (Unix)
///
/// | Signal  | Action        | Nginx Equivalent  |
/// |---------|---------------|-------------------|
/// | SIGHUP  | Reload site   | `nginx -s reload` |
/// | SIGTERM | Graceful stop | `nginx -s stop`   |
/// | SIGINT  | Graceful stop | Ctrl+C            |
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>, state: Arc<AppState>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let registered = (|| {
            Ok::<_, std::io::Error>((
                signal(SignalKind::hangup())?,
                signal(SignalKind::terminate())?,
                signal(SignalKind::interrupt())?,
            ))
        })();
        let (mut sighup, mut sigterm, mut sigint) = match registered {
            Ok(signals) => signals,
            Err(e) => {
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
                return;
            }
        };

        tracing::info!(pid = std::process::id(), "signal handlers registered (HUP reloads, TERM/INT stop)");

        loop {
            tokio::select! {
                _ = sighup.recv() => reload_site(&state).await,
                _ = sigterm.recv() => {
                    handler.request_shutdown("SIGTERM received");
                    break;
                }
                _ = sigint.recv() => {
                    handler.request_shutdown("SIGINT received");
                    break;
                }
            }
        }
    });
}

/// Fallback for platforms without Unix signals - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>, _state: Arc<AppState>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handler.request_shutdown("Ctrl+C received");
        }
    });
}
