//! Authorization-code capture
//!
//! The OIDC provider redirects the browser here with `?code=...` once the user
//! has authenticated. The code is acknowledged and echoed back; it is not
//! exchanged for tokens and `state` is not checked.

use super::router::RequestHandler;
use crate::http::{IncomingRequest, OutgoingResponse};

pub const OIDC_REDIRECT_PATH: &str = "/oidc-redirect";

/// Prefix of the acknowledgement body
pub const CODE_RECEIVED_PREFIX: &str = "Received authorization code: ";

/// Handler for the provider's redirect callback
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthorizationCodeCapture;

impl RequestHandler for AuthorizationCodeCapture {
    fn handle(&self, request: &IncomingRequest) -> OutgoingResponse {
        // A missing code is not an error, it reads as empty
        let code = request.query_param_or_empty("code");
        OutgoingResponse::ok(format!("{CODE_RECEIVED_PREFIX}{code}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{HeaderMap, Method, StatusCode, Uri};

    fn handle(uri: &str) -> OutgoingResponse {
        let uri: Uri = uri.parse().unwrap();
        let request = IncomingRequest::new(Method::GET, &uri, HeaderMap::new());
        AuthorizationCodeCapture.handle(&request)
    }

    #[test]
    fn test_code_is_echoed() {
        let response = handle("/oidc-redirect?code=abc123");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "Received authorization code: abc123");
    }

    #[test]
    fn test_missing_code_is_empty() {
        let response = handle("/oidc-redirect");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "Received authorization code: ");

        let response = handle("/oidc-redirect?state=xyz");
        assert_eq!(response.body, "Received authorization code: ");
    }

    #[test]
    fn test_state_has_no_effect() {
        let with_state = handle("/oidc-redirect?code=abc123&state=xyz");
        let without_state = handle("/oidc-redirect?code=abc123");
        assert_eq!(with_state, without_state);
    }

    #[test]
    fn test_code_is_echoed_verbatim() {
        let response = handle("/oidc-redirect?code=a+b");
        assert_eq!(response.body, "Received authorization code: a+b");

        let response = handle("/oidc-redirect?code=a%2Fb");
        assert_eq!(response.body, "Received authorization code: a%2Fb");
    }

    #[test]
    fn test_repeated_code_uses_last_value() {
        let response = handle("/oidc-redirect?code=first&code=second");
        assert_eq!(response.body, "Received authorization code: second");
    }
}
