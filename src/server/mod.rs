// Server module entry point
// Listener setup, connection handling, signals and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

// Re-export common types
pub use connection::accept_connection;
pub use listener::create_reusable_listener;
pub use signal::{start_signal_handler, SignalHandler};

/// Accept connections until shutdown is requested
///
/// In-flight connections keep running in their own tasks after this returns.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = signals.wait_for_shutdown() => break,
        }
    }
}
