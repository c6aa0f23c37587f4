//! Minimal OpenID Connect redirect receiver.
//!
//! Serves two GET routes over HTTP/1.1:
//! - `/oidc-redirect` acknowledges the authorization `code` sent back by the
//!   identity provider,
//! - `/protected` echoes the `Authorization` header.
//!
//! Anything else is `404 Not found`. Token exchange and token verification
//! are not performed.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::{BindError, ServiceError};
pub use handler::{RequestHandler, Router};
pub use server::HttpListenerService;
