use http::StatusCode;
use thiserror::Error;

use crate::classify::ErrorBody;
use crate::transport::{ApiResponse, TransportError};

/// Error surface of the access layer. Only the expired-access-credential
/// case is ever handled internally; everything here is what callers see.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with a non-success status. Carries the parsed
    /// application error body when there was one, plus the raw text.
    #[error("request failed with status {status}")]
    Status {
        status: StatusCode,
        body: Option<ErrorBody>,
        raw: String,
    },

    /// No response was received at all (connect error, timeout, ...).
    #[error("network failure: {0}")]
    Network(#[from] TransportError),

    /// The refresh exchange itself concluded with a failure. Every waiter
    /// queued behind that exchange receives this same error.
    #[error("credential refresh failed: {0}")]
    RefreshFailed(#[source] Box<ApiError>),

    /// No refresh credential existed when one was needed; the session is
    /// over and the user has been routed to re-authentication.
    #[error("session expired, no refresh credential available")]
    SessionExpired,

    /// The server responded but the body did not have the expected shape.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// Wraps a failed response unchanged, preserving the subcode payload
    /// for callers that want to inspect it.
    pub fn from_response(response: &ApiResponse) -> Self {
        ApiError::Status {
            status: response.status(),
            body: response.error_body(),
            raw: response.text().to_string(),
        }
    }

    /// The transport status code, for responses that carried one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }
}
