//! HTTP listener service
//!
//! Owns the lifecycle of exactly one listener binding:
//! `Unopened -> Open -> Closed`. `start()` returns once the socket is
//! listening; `stop()` returns once it is closed and is safe to call twice.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use super::listener::ListenerBinding;
use super::server_loop::run_server_loop;
use crate::config::PerformanceConfig;
use crate::error::ServiceError;
use crate::handler::Router;
use crate::logger;

/// A running accept loop and the means to stop it
struct OpenListener {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

enum Lifecycle {
    Unopened,
    Open(OpenListener),
    Closed,
}

pub struct HttpListenerService {
    base_url: String,
    router: Arc<Router>,
    performance: PerformanceConfig,
    state: Mutex<Lifecycle>,
}

impl HttpListenerService {
    pub fn new(base_url: impl Into<String>, router: Router, performance: PerformanceConfig) -> Self {
        Self {
            base_url: base_url.into(),
            router: Arc::new(router),
            performance,
            state: Mutex::new(Lifecycle::Unopened),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bind the configured base URL and start accepting connections.
    ///
    /// Returns the bound local address. The listener is accepting by the
    /// time this returns. Bind failures are not retried.
    pub async fn start(&self) -> Result<SocketAddr, ServiceError> {
        let mut state = self.state.lock().await;
        match &*state {
            Lifecycle::Open(open) => return Err(ServiceError::AlreadyStarted(open.local_addr)),
            Lifecycle::Closed => return Err(ServiceError::Closed),
            Lifecycle::Unopened => {}
        }

        let binding = ListenerBinding::parse(&self.base_url)?;
        let listener = binding.bind().await?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| crate::error::BindError::Resolve {
                authority: binding.authority(),
                source,
            })?;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_server_loop(
            listener,
            Arc::clone(&self.router),
            self.performance.clone(),
            shutdown_rx,
        ));

        logger::log_debug(&format!("Listener for {binding} open on {local_addr}"));
        *state = Lifecycle::Open(OpenListener {
            local_addr,
            shutdown,
            task,
        });
        Ok(local_addr)
    }

    /// Close the listener and wait until it no longer accepts connections.
    ///
    /// A no-op when already closed. Stopping a service that was never
    /// started closes it too.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let previous = std::mem::replace(&mut *state, Lifecycle::Closed);

        if let Lifecycle::Open(open) = previous {
            // Receiver only disappears if the loop already exited
            let _ = open.shutdown.send(true);
            if let Err(e) = open.task.await {
                logger::log_error(&format!("Accept loop ended abnormally: {e}"));
            }
            logger::log_service_stopped(&open.local_addr);
        }
    }

    /// Bound address while open
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.state.lock().await {
            Lifecycle::Open(open) => Some(open.local_addr),
            Lifecycle::Unopened | Lifecycle::Closed => None,
        }
    }

    pub async fn is_open(&self) -> bool {
        matches!(&*self.state.lock().await, Lifecycle::Open(_))
    }
}

impl Drop for HttpListenerService {
    fn drop(&mut self) {
        if let Lifecycle::Open(open) = self.state.get_mut() {
            let _ = open.shutdown.send(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn service(base_url: &str) -> HttpListenerService {
        HttpListenerService::new(
            base_url,
            Router::with_default_routes(),
            PerformanceConfig::default(),
        )
    }

    /// Send a GET over a fresh connection and return (status, body)
    async fn http_get(addr: SocketAddr, target: &str, headers: &[(&str, &str)]) -> (u16, String) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
        for (name, value) in headers {
            request.push_str(&format!("{name}: {value}\r\n"));
        }
        request.push_str("\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let raw = String::from_utf8(raw).unwrap();

        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        let status = head
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap();
        (status, body.to_string())
    }

    #[tokio::test]
    async fn test_start_serves_routes_immediately() {
        let service = service("http://127.0.0.1:0");
        let addr = service.start().await.unwrap();
        assert!(service.is_open().await);
        assert_eq!(service.local_addr().await, Some(addr));

        let (status, body) = http_get(addr, "/oidc-redirect?code=abc123&state=xyz", &[]).await;
        assert_eq!(status, 200);
        assert_eq!(body, "Received authorization code: abc123");

        let (status, body) =
            http_get(addr, "/protected", &[("Authorization", "Bearer tok")]).await;
        assert_eq!(status, 200);
        assert_eq!(body, "this is the provided token: Bearer tok");

        let (status, body) = http_get(addr, "/unknown", &[]).await;
        assert_eq!(status, 404);
        assert_eq!(body, "Not found");

        service.stop().await;
    }

    #[tokio::test]
    async fn test_missing_values_degrade_to_empty() {
        let service = service("http://127.0.0.1:0");
        let addr = service.start().await.unwrap();

        let (status, body) = http_get(addr, "/oidc-redirect", &[]).await;
        assert_eq!(status, 200);
        assert_eq!(body, "Received authorization code: ");

        let (status, body) = http_get(addr, "/protected", &[]).await;
        assert_eq!(status, 200);
        assert_eq!(body, "this is the provided token: ");

        service.stop().await;
    }

    #[tokio::test]
    async fn test_stop_refuses_new_connections() {
        let service = service("http://127.0.0.1:0");
        let addr = service.start().await.unwrap();
        service.stop().await;

        assert!(!service.is_open().await);
        assert_eq!(service.local_addr().await, None);
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let service = service("http://127.0.0.1:0");
        service.start().await.unwrap();
        service.stop().await;
        service.stop().await;
        assert!(!service.is_open().await);
    }

    #[tokio::test]
    async fn test_stop_before_start_closes() {
        let service = service("http://127.0.0.1:0");
        service.stop().await;
        assert!(matches!(service.start().await, Err(ServiceError::Closed)));
    }

    #[tokio::test]
    async fn test_lifecycle_misuse() {
        let service = service("http://127.0.0.1:0");
        let addr = service.start().await.unwrap();
        assert!(matches!(
            service.start().await,
            Err(ServiceError::AlreadyStarted(a)) if a == addr
        ));

        service.stop().await;
        assert!(matches!(service.start().await, Err(ServiceError::Closed)));
    }

    #[tokio::test]
    async fn test_start_fails_on_occupied_port() {
        let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = holder.local_addr().unwrap().port();

        let service = service(&format!("http://127.0.0.1:{port}"));
        let err = service.start().await.unwrap_err();
        assert!(matches!(err, ServiceError::Bind(BindError::Io { .. })));
        assert!(!service.is_open().await);
    }

    #[tokio::test]
    async fn test_start_fails_on_malformed_url() {
        let err = service("localhost 8080").start().await.unwrap_err();
        assert!(matches!(err, ServiceError::Bind(BindError::InvalidUrl { .. })));

        let err = service("https://127.0.0.1:0").start().await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Bind(BindError::UnsupportedScheme { .. })
        ));
    }
}
