// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::{AppState, PerformanceConfig};
use crate::handler;
use crate::logger;

/// Admit a connection if under the configured limit and serve it in a new task
///
/// Returns `false` when the connection was rejected.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) -> bool {
    if !try_acquire(conn_counter, state.config.performance.max_connections) {
        logger::log_warning(&format!(
            "Max connections reached, rejecting {peer_addr}"
        ));
        drop(stream);
        return false;
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
    true
}

/// Increment first, then check the limit, rolling back on rejection
fn try_acquire(conn_counter: &AtomicUsize, max_connections: Option<u64>) -> bool {
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    match max_connections {
        Some(max) if prev_count >= usize::try_from(max).unwrap_or(usize::MAX) => {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            false
        }
        _ => true,
    }
}

/// Upper bound on a connection's lifetime
fn connection_timeout(performance: &PerformanceConfig) -> Duration {
    Duration::from_secs(
        performance
            .read_timeout
            .max(performance.write_timeout)
            .max(performance.keep_alive_timeout),
    )
}

fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;
        let timeout_duration = connection_timeout(performance);

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout_duration.as_secs()
            )),
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
