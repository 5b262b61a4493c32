//! Library exports for tokengate, the client-side HTTP access layer:
//! bearer credential attachment, failure classification, and the
//! single-flight refresh coordinator.

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod refresh;
pub mod session;
pub mod signals;
pub mod store;
pub mod transport;
pub mod utils;

pub use classify::{classify, FailureKind};
pub use client::ApiClient;
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, Transport, TransportError};
