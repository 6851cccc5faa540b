//! Error types for request dispatch.

use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Failures raised while building, dispatching, or decoding an API call.
///
/// Status codes are never errors at this layer: a 401 or 500 comes back as an
/// [`ApiResponse`](crate::response::ApiResponse) for the caller to inspect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Base URL is missing or malformed.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Header name or value could not be encoded.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name as supplied by the caller
        name: String,
        /// Why the header was rejected
        reason: String,
    },

    /// HTTP request failed before a response arrived.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response body could not be read or decoded.
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}
