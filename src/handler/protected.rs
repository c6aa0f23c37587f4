//! Bearer token echo
//!
//! Nominally protected route. The `Authorization` header is echoed back as
//! received; there is no verification and the reply is always 200.

use super::router::RequestHandler;
use crate::http::{IncomingRequest, OutgoingResponse};

pub const PROTECTED_PATH: &str = "/protected";

pub const TOKEN_ECHO_PREFIX: &str = "this is the provided token: ";

#[derive(Debug, Default, Clone, Copy)]
pub struct BearerEcho;

impl RequestHandler for BearerEcho {
    fn handle(&self, request: &IncomingRequest) -> OutgoingResponse {
        let token = request.header_or_empty("Authorization");
        OutgoingResponse::ok(format!("{TOKEN_ECHO_PREFIX}{token}"))
    }
}
