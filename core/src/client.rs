//! API client with an ordered middleware chain.

use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::transport::{Middleware, Transport};
use std::fmt;
use std::sync::Arc;

/// Client that runs every request through registered middleware before
/// handing it to the transport.
///
/// Cloning is cheap when the transport is: middleware instances are shared,
/// so state they hold (e.g. a credential store) is shared too.
///
/// # Example
///
/// ```ignore
/// let client = ApiClient::new(ReqwestTransport::from_env()?)
///     .with_middleware(CredentialInterceptor::new(store.clone()));
///
/// let response = client.execute(ApiRequest::get("/api/members/me")).await?;
/// ```
#[derive(Clone)]
pub struct ApiClient<T> {
    transport: T,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl<T: Transport> ApiClient<T> {
    /// Create a client with no middleware.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            middleware: Vec::new(),
        }
    }

    /// Append middleware to the chain.
    #[must_use]
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append shared middleware to the chain.
    pub fn register(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Run the middleware chain without dispatching.
    ///
    /// Middleware runs in registration order.
    #[must_use]
    pub fn prepare(&self, request: ApiRequest) -> ApiRequest {
        self.middleware
            .iter()
            .fold(request, |request, middleware| middleware.before_send(request))
    }

    /// Run the middleware chain, then dispatch.
    ///
    /// # Errors
    ///
    /// Propagates transport failures. HTTP error statuses are not errors.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request = self.prepare(request);
        tracing::debug!(method = %request.method, path = %request.path, "dispatching request");

        let response = self.transport.send(request).await?;
        tracing::debug!(status = %response.status, "received response");
        Ok(response)
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: fmt::Debug> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = self.middleware.iter().map(|m| m.name()).collect();
        f.debug_struct("ApiClient")
            .field("transport", &self.transport)
            .field("middleware", &names)
            .finish()
    }
}
