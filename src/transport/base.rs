use async_trait::async_trait;
use thiserror::Error;

use super::request::{ApiRequest, ApiResponse};

/// Failure at the network level: the server never produced a response.
/// Responses with failure statuses are *not* errors at this boundary; the
/// classifier needs their status and body.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("no response received: {0}")]
    NoResponse(String),
}

/// The Transport trait abstracts "send a request, get a response or a
/// network error", so the access layer can be exercised without a real
/// HTTP client behind it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
