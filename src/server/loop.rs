// Server loop module
// Accepts connections until the owning service signals shutdown

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::accept_connection;
use crate::config::PerformanceConfig;
use crate::handler::Router;
use crate::logger;

/// Accept loop for one listener binding.
///
/// Returns, dropping (and thereby closing) the listener, once `shutdown`
/// changes or its sender is gone. Connections already accepted keep running
/// on their own tasks.
#[allow(clippy::ignored_unit_patterns)]
pub async fn run_server_loop(
    listener: TcpListener,
    router: Arc<Router>,
    performance: PerformanceConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &router, &performance);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.changed() => {
                logger::log_debug("Accept loop received shutdown signal");
                break;
            }
        }
    }

    drop(listener);
}
