//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, exact path
//! matching and dispatch to a single [`RequestHandler`].

use crate::http::{self, IncomingRequest, OutgoingResponse};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::oidc_redirect::{AuthorizationCodeCapture, OIDC_REDIRECT_PATH};
use super::protected::{BearerEcho, PROTECTED_PATH};

/// A single route's behavior. Handlers return their response instead of
/// writing it, so every request gets exactly one reply.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &IncomingRequest) -> OutgoingResponse;
}

impl<F> RequestHandler for F
where
    F: Fn(&IncomingRequest) -> OutgoingResponse + Send + Sync,
{
    fn handle(&self, request: &IncomingRequest) -> OutgoingResponse {
        self(request)
    }
}

/// Handlers keyed by exact, case-sensitive path
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, Box<dyn RequestHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router serving `/oidc-redirect` and `/protected`
    pub fn with_default_routes() -> Self {
        let mut router = Self::new();
        router.register(OIDC_REDIRECT_PATH, AuthorizationCodeCapture);
        router.register(PROTECTED_PATH, BearerEcho);
        router
    }

    /// Register `handler` for `path`, replacing any previous handler
    pub fn register(&mut self, path: impl Into<String>, handler: impl RequestHandler + 'static) {
        self.routes.insert(path.into(), Box::new(handler));
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Select and invoke exactly one handler; unknown paths get 404
    pub fn dispatch(&self, request: &IncomingRequest) -> OutgoingResponse {
        self.routes
            .get(request.path())
            .map_or_else(OutgoingResponse::not_found, |handler| {
                handler.handle(request)
            })
    }

    /// Turn a hyper request into its single hyper response.
    /// Only GET is served; the request body is never read.
    pub fn respond<B>(&self, req: Request<B>, peer_addr: SocketAddr) -> Response<Full<Bytes>> {
        let started = Instant::now();
        let (parts, _body) = req.into_parts();
        let request = IncomingRequest::from_parts(&parts);

        let (response, status, body_bytes) = if request.method() == Method::GET {
            let outgoing = self.dispatch(&request);
            let status = outgoing.status;
            let body_bytes = outgoing.body.len();
            (outgoing.into_hyper(), status, body_bytes)
        } else {
            logger::log_warning(&format!(
                "Method not allowed: {} {}",
                parts.method,
                parts.uri.path()
            ));
            let response = http::build_405_response();
            let status = response.status();
            (response, status, 0)
        };

        if logger::access_log_enabled() {
            let mut entry = access_entry(&parts, peer_addr, status.as_u16(), body_bytes);
            entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            logger::log_access(&entry);
        }

        response
    }
}

/// Access log entry for a served request.
/// Path and query are taken from the raw URI, never the decoded path.
fn access_entry(parts: &Parts, peer_addr: SocketAddr, status: u16, body_bytes: usize) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(logger::redact_query);
    entry.http_version = logger::http_version_label(parts.version).to_string();
    entry.status = status;
    entry.body_bytes = body_bytes;
    entry.user_agent = parts
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    router: Arc<Router>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(router.respond(req, peer_addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn get(uri: &str, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    async fn call(router: &Arc<Router>, req: Request<()>) -> (StatusCode, String) {
        let response = handle_request(req, Arc::clone(router), peer()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_oidc_redirect_route() {
        let router = Arc::new(Router::with_default_routes());
        let (status, body) = call(&router, get("/oidc-redirect?code=abc123&state=xyz", &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Received authorization code: abc123");
    }

    #[tokio::test]
    async fn test_protected_route() {
        let router = Arc::new(Router::with_default_routes());
        let (status, body) =
            call(&router, get("/protected", &[("Authorization", "Bearer tok")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "this is the provided token: Bearer tok");

        let (status, body) = call(&router, get("/protected", &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "this is the provided token: ");
    }

    #[tokio::test]
    async fn test_unknown_paths_are_404() {
        let router = Arc::new(Router::with_default_routes());
        for uri in [
            "/unknown",
            "/",
            "/protected/",
            "/Protected",
            "/oidc-redirect/extra",
            "/unknown?code=abc",
        ] {
            let (status, body) =
                call(&router, get(uri, &[("Authorization", "Bearer tok")])).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, "Not found", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_encoded_path_matches_decoded_route() {
        let router = Arc::new(Router::with_default_routes());
        let (status, _) = call(&router, get("/%70rotected", &[])).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_get_is_rejected() {
        let router = Arc::new(Router::with_default_routes());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/oidc-redirect?code=abc")
            .body(())
            .unwrap();
        let (status, _) = call(&router, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_custom_handler_registration() {
        let mut router = Router::new();
        router.register("/ping", |_: &IncomingRequest| OutgoingResponse::ok("pong"));
        assert_eq!(router.paths(), vec!["/ping"]);

        let uri = hyper::Uri::from_static("/ping");
        let request = IncomingRequest::new(Method::GET, &uri, hyper::HeaderMap::new());
        assert_eq!(router.dispatch(&request), OutgoingResponse::ok("pong"));
    }

    #[test]
    fn test_default_routes() {
        let router = Router::with_default_routes();
        assert_eq!(router.paths(), vec!["/oidc-redirect", "/protected"]);
    }

    #[test]
    fn test_access_entry_uses_raw_path() {
        let req = get(
            "/x%0Aforged%20line?code=secret&state=a+b",
            &[("User-Agent", "curl/8.0")],
        );
        let (parts, ()) = req.into_parts();
        let entry = access_entry(&parts, peer(), 404, 9);

        assert_eq!(entry.path, "/x%0Aforged%20line");
        assert_eq!(entry.query.as_deref(), Some("code=[redacted]&state=a+b"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(entry.format("combined").lines().count(), 1);
    }
}
