//! Error types for the listener service
//!
//! Request handling never fails: missing parameters and headers degrade to
//! empty strings. Only opening and closing the listener can surface errors.

use std::net::SocketAddr;

/// The listener could not be opened. Fatal at start-up, never retried.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme '{scheme}' in base URL (only http is served)")]
    UnsupportedScheme { scheme: String },

    #[error("base URL '{url}' has no host")]
    MissingHost { url: String },

    #[error("could not resolve '{authority}': {source}")]
    Resolve {
        authority: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Io {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Lifecycle errors reported by [`crate::server::HttpListenerService`]
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("listener is already open on {0}")]
    AlreadyStarted(SocketAddr),

    #[error("listener has been closed and cannot be reopened")]
    Closed,
}
