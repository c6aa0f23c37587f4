//! HTTP response building module
//!
//! Handlers produce an [`OutgoingResponse`]; the connection layer turns it
//! into exactly one hyper response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Status and body produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub status: StatusCode,
    pub body: String,
}

impl OutgoingResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 OK
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// 404 Not Found with the fixed body `Not found`
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }

    /// Convert into a plain-text hyper response
    pub fn into_hyper(self) -> Response<Full<Bytes>> {
        let status = self.status;
        let content_length = self.body.len();
        Response::builder()
            .status(status)
            .header("Content-Type", TEXT_PLAIN)
            .header("Content-Length", content_length)
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                log_build_error(status.as_str(), &e);
                build_500_response()
            })
    }
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", TEXT_PLAIN)
        .header("Allow", "GET")
        .body(Full::new(Bytes::from("Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            build_500_response()
        })
}

/// Fallback used when a response cannot be assembled
fn build_500_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from("Internal Server Error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_into_hyper_sets_plain_text() {
        let response = OutgoingResponse::ok("hello").into_hyper();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], TEXT_PLAIN);
        assert_eq!(response.headers()["content-length"], "5");
        assert_eq!(body_string(response).await, "hello");
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = OutgoingResponse::not_found().into_hyper();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Not found");
    }

    #[test]
    fn test_405_advertises_get() {
        let response = build_405_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "GET");
    }
}
