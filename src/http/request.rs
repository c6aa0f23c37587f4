//! Incoming request model
//!
//! A request-scoped, immutable view of what the router and handlers need:
//! method, decoded path, query parameters and headers.

use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Uri};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// A received request, owned by the handler invocation that processes it
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
}

impl IncomingRequest {
    pub fn new(method: Method, uri: &Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            path: decode_path(uri.path()),
            query: parse_query(uri.query()),
            headers,
        }
    }

    /// Build from the head of a hyper request; the body is never read
    pub fn from_parts(parts: &Parts) -> Self {
        Self::new(parts.method.clone(), &parts.uri, parts.headers.clone())
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Percent-decoded request path
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Query parameter value, or `""` when absent
    pub fn query_param_or_empty(&self, name: &str) -> &str {
        self.query_param(name).unwrap_or_default()
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Header value, or `""` when absent
    pub fn header_or_empty(&self, name: &str) -> &str {
        self.header(name).unwrap_or_default()
    }
}

/// Percent-decode a request path.
/// Sequences that do not decode to UTF-8 leave the raw path untouched.
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned)
}

/// Split a query string on `&` and `=` into unique keys.
/// Values are kept exactly as sent (no percent or `+` decoding) and the
/// last occurrence of a repeated key wins. A segment without `=` is a key
/// with an empty value.
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some(query) = query else {
        return params;
    };

    for segment in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        params.insert(key.to_string(), value.to_string());
    }
    params
}
