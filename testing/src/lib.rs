//! # Shopcheck Testing
//!
//! Harness for the Shopcheck API contract tests.
//!
//! This crate provides:
//! - [`TestContext`]: store, intercepted client, and session coordinator wired
//!   together
//! - [`live_context`]: a fork of one shared context against the server at `API_BASE_URL`
//! - [`MockTransport`]: in-memory transport with canned responses
//! - [`init_test_tracing`]: captured log output for tests
//!
//! ## Example
//!
//! ```ignore
//! use shopcheck_testing::{TestContext, MockTransport};
//!
//! #[tokio::test]
//! async fn test_profile_is_authenticated() {
//!     let (ctx, transport) = TestContext::mock(SessionConfig::new());
//!     let transport = transport.with_member_backend(42, "sid=abc");
//!
//!     ctx.ensure_ready(IdentityClass::General).await.unwrap();
//!     ctx.send(ApiRequest::get("/api/members/me")).await.unwrap();
//!
//!     assert_eq!(transport.last_request().unwrap().header_str("cookie"), Some("sid=abc"));
//! }
//! ```

pub mod context;
pub mod logging;
pub mod mock_transport;

// Re-export commonly used items
pub use context::{HttpCoordinator, TestContext, live_context};
pub use logging::init_test_tracing;
pub use mock_transport::{MockTransport, created_response, json_response, sign_in_response};
