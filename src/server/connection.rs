// Connection handling module
// Serves a single accepted TCP connection with hyper's HTTP/1 builder

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::PerformanceConfig;
use crate::handler::{self, Router};
use crate::logger;

/// Accept a connection and serve it on its own task.
///
/// No connection limit is applied; every accepted connection is served.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `router` - Shared, immutable router
/// * `performance` - Keep-alive and timeout settings
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    router: &Arc<Router>,
    performance: &PerformanceConfig,
) {
    logger::log_connection_accepted(&peer_addr);

    let router = Arc::clone(router);
    let keep_alive = performance.keep_alive();
    let timeout_duration = performance.connection_timeout();

    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&router), peer_addr)),
        );

        // A zero timeout disables the limit
        if timeout_duration.is_zero() {
            if let Err(err) = conn.await {
                logger::log_connection_error(&err);
            }
            return;
        }

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}
