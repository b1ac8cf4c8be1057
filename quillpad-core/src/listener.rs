//! Stub TCP listener
//!
//! Accepts connections and drops them straight away. It shares nothing with
//! the content core; failing to bind only costs a log line.

use crate::shutdown::{ShutdownCoordinator, ShutdownHandler};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Pause before accepting again after a transient failure
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Bind `addr` and serve forever, or log and return if the bind fails
pub async fn run_listener(addr: SocketAddr) {
    match TcpListener::bind(addr).await {
        Ok(listener) => serve(listener).await,
        Err(e) => {
            error!(%addr, error = %e, "Could not start server on {}. Is it already in use?", addr);
        }
    }
}

/// Accept-and-close loop over an already bound listener
pub async fn serve(listener: TcpListener) {
    match listener.local_addr() {
        Ok(addr) => info!(%addr, "Server started on port {}...", addr.port()),
        Err(e) => warn!(error = %e, "Server started on unknown address"),
    }

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!(%peer, "Client connected: {}", peer.ip());
                drop(stream);
            }
            Err(e) => {
                if !recover_from_accept_error(&e).await {
                    return;
                }
            }
        }
    }
}

// Returns false when the listener should stop. Transient failures back off
// first so fd exhaustion does not spin the loop.
async fn recover_from_accept_error(e: &io::Error) -> bool {
    if is_fatal(e) {
        error!(error = %e, "Listener stopped");
        return false;
    }
    warn!(error = %e, "Failed to accept connection");
    tokio::time::sleep(ACCEPT_BACKOFF).await;
    true
}

// Per-connection failures (reset before accept, fd pressure) are retried
fn is_fatal(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::NotConnected | io::ErrorKind::Unsupported
    )
}

/// Run the listener as an independent task that stops on shutdown
pub fn spawn_listener(addr: SocketAddr, coordinator: Arc<ShutdownCoordinator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        ShutdownHandler::new(coordinator, "listener")
            .run(|| run_listener(addr))
            .await;
    })
}
