//! Transport and middleware traits.

use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use std::future::Future;

/// Sends a fully-prepared request and buffers the response.
///
/// # Implementation Notes
///
/// - Non-2xx statuses are returned as `Ok`; only I/O and decoding failures
///   are errors
/// - Implementations own the base URL; `request.path` is relative to it
pub trait Transport: Send + Sync {
    /// Dispatch one request.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The request cannot be encoded
    /// - The network call fails
    /// - The response body cannot be read
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send;
}

/// Request hook run by [`ApiClient`](crate::client::ApiClient) before every
/// dispatch.
///
/// Middleware is synchronous and infallible: it receives the request by value
/// and returns the (possibly rewritten) request to pass on.
pub trait Middleware: Send + Sync {
    /// Name used in tracing output.
    fn name(&self) -> &'static str;

    /// Rewrite an outgoing request.
    fn before_send(&self, request: ApiRequest) -> ApiRequest;
}
