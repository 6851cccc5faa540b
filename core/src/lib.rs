//! # Shopcheck Core
//!
//! Transport abstraction for the Shopcheck API contract suite.
//!
//! Test code never talks to an HTTP library directly. It builds an
//! [`ApiRequest`], and an [`ApiClient`] runs that request through an ordered
//! chain of [`Middleware`] before a [`Transport`] dispatches it:
//!
//! ```text
//! ApiRequest → Middleware₁ → … → Middlewareₙ → Transport → ApiResponse
//! ```
//!
//! The middleware chain is the registration point for request rewriting
//! (credential attachment lives in `shopcheck-auth`). Transports are
//! swappable: [`ReqwestTransport`] talks to a live server, while the testing
//! crate provides a recording mock.
//!
//! ## Example
//!
//! ```ignore
//! use shopcheck_core::{ApiClient, ApiRequest, ReqwestTransport};
//!
//! let client = ApiClient::new(ReqwestTransport::new("http://localhost:8080")?);
//! let response = client.execute(ApiRequest::get("/api/categories")).await?;
//! assert!(response.is_success());
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod error;
pub mod http_transport;
pub mod request;
pub mod response;
pub mod transport;

// Re-export main types for convenience
pub use client::ApiClient;
pub use error::{Result, TransportError};
pub use http_transport::ReqwestTransport;
pub use request::ApiRequest;
pub use response::ApiResponse;
pub use transport::{Middleware, Transport};

// HTTP primitives used in the public API
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
