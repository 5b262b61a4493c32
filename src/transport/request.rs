use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::classify::ErrorBody;

/// An outgoing request plus the retry bookkeeping the access layer needs:
/// whether the caller supplied its own Authorization header (credential
/// exchanges are exempt from attachment), and whether this request already
/// went through one refresh-and-replay cycle.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
    explicit_auth: bool,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            explicit_auth: false,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body.
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header. Setting Authorization this way marks the request as
    /// carrying an explicit credential, which exempts it from the outbound
    /// attachment step.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        if name == AUTHORIZATION {
            self.explicit_auth = true;
        }
        self.headers.insert(name, value);
        self
    }

    /// Caller-supplied bearer credential (e.g. the refresh exchange itself).
    pub fn with_bearer(self, token: &str) -> Self {
        match bearer_value(token) {
            Some(value) => self.with_header(AUTHORIZATION, value),
            None => self,
        }
    }

    /// Sets (or rebuilds) the bearer header without claiming it as
    /// caller-supplied. Used by the outbound attachment step and by replays
    /// after a successful refresh. Never fails: a credential that cannot be
    /// encoded as a header value leaves the request unmodified.
    pub fn set_bearer(&mut self, token: &str) {
        match bearer_value(token) {
            Some(value) => {
                self.headers.insert(AUTHORIZATION, value);
            }
            None => {
                warn!("credential is not a valid header value, leaving request unmodified");
            }
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// True when the caller set its own Authorization header.
    pub fn has_explicit_authorization(&self) -> bool {
        self.explicit_auth
    }

    /// The sole retry budget: once spent, another expiry failure on this
    /// request is treated as unrecoverable.
    pub fn retried(&self) -> bool {
        self.retried
    }

    pub fn mark_retried(&mut self) {
        self.retried = true;
    }
}

fn bearer_value(token: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {}", token)).ok()
}

/// A ranked response from the transport: any HTTP status, headers and the
/// body text. Failure statuses flow through the classifier, which needs the
/// application subcode out of the body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        ApiResponse {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// The application-level error body, when the response carried one.
    pub fn error_body(&self) -> Option<ErrorBody> {
        serde_json::from_str(&self.body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_request_is_not_explicit() {
        let request = ApiRequest::get("/zones");
        assert!(!request.has_explicit_authorization());
        assert!(!request.retried());
    }

    #[test]
    fn test_with_bearer_marks_explicit() {
        let request = ApiRequest::post("/auth/refresh").with_bearer("refresh-1");
        assert!(request.has_explicit_authorization());
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer refresh-1"
        );
    }

    #[test]
    fn test_set_bearer_rebuilds_header_without_claiming_it() {
        let mut request = ApiRequest::get("/zones");
        request.set_bearer("t1");
        request.set_bearer("t2");
        assert!(!request.has_explicit_authorization());
        assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Bearer t2");
    }

    #[test]
    fn test_set_bearer_rejects_invalid_value() {
        let mut request = ApiRequest::get("/zones");
        request.set_bearer("bad\ntoken");
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_error_body_parses_subcode_payload() {
        let response = ApiResponse::new(
            StatusCode::UNAUTHORIZED,
            HeaderMap::new(),
            r#"{"errorCode": 40101, "errorData": {"verifyAccountToken": "abc"}}"#.to_string(),
        );
        let body = response.error_body().expect("body should parse");
        assert_eq!(body.error_code, Some(40101));
        assert_eq!(
            body.error_data.and_then(|d| d.verify_account_token),
            Some("abc".to_string())
        );
    }
}
