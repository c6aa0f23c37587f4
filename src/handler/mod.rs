//! Request handler module
//!
//! Responsible for request routing dispatch and the two route handlers:
//! authorization-code capture and bearer-token echo.

pub mod oidc_redirect;
pub mod protected;
pub mod router;

// Re-export main entry point
pub use router::{handle_request, RequestHandler, Router};
