pub mod base;
pub mod http_transport;
pub mod request;

pub use base::{Transport, TransportError};
pub use http_transport::HttpTransport;
pub use request::{ApiRequest, ApiResponse};
