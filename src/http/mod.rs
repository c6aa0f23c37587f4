//! HTTP protocol layer module
//!
//! Request and response value types shared by the router and the connection
//! layer, decoupled from the handlers' business logic.

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::IncomingRequest;
pub use response::{build_405_response, OutgoingResponse};
