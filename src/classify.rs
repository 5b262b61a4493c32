//! Failure classification for ranked error responses.
//!
//! The backend multiplexes several authentication failures under the 401
//! status and distinguishes them with a numeric subcode in the body, so the
//! subcode has to be read before anything can be decided. Classification is
//! a pure function; every side effect lives in the client or the refresh
//! coordinator.

use http::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::transport::ApiResponse;

/// Application subcode for "account exists but was never verified".
pub const SUBCODE_UNVERIFIED_ACCOUNT: i64 = 40101;
/// Application subcode for "the access credential has expired".
pub const SUBCODE_ACCESS_EXPIRED: i64 = 40102;

/// The application-level error body as the backend emits it.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_data: Option<ErrorData>,
}

/// Extra payload attached to some failures.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    #[serde(default)]
    pub verify_account_token: Option<String>,
}

/// The failure categories of the access layer, in classification priority
/// order. Only `ExpiredAccess` ever routes into the refresh flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// 401 with the unverified-account subcode. Terminal; carries the
    /// verification token extracted from the error payload.
    UnverifiedAccount { verify_token: Option<String> },
    /// 401 with the expired-credential subcode.
    ExpiredAccess,
    /// 401 with any other (or no) subcode.
    OtherUnauthorized,
    /// 403.
    Forbidden,
    /// 5xx.
    ServerError,
    /// Any other failure status.
    Other,
}

/// Produces exactly one category for a failed response. The subcode is
/// checked before falling back to `OtherUnauthorized`, since all three
/// unauthorized categories share the 401 status.
pub fn classify(response: &ApiResponse) -> FailureKind {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        let body = response.error_body();
        return match body.as_ref().and_then(|b| b.error_code) {
            Some(SUBCODE_UNVERIFIED_ACCOUNT) => FailureKind::UnverifiedAccount {
                verify_token: body
                    .and_then(|b| b.error_data)
                    .and_then(|d| d.verify_account_token),
            },
            Some(SUBCODE_ACCESS_EXPIRED) => FailureKind::ExpiredAccess,
            _ => FailureKind::OtherUnauthorized,
        };
    }

    if status == StatusCode::FORBIDDEN {
        return FailureKind::Forbidden;
    }
    if status.is_server_error() {
        return FailureKind::ServerError;
    }
    FailureKind::Other
}
