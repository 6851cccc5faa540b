//! # Shopcheck Session Authentication
//!
//! Session handling for the Shopcheck API contract suite: which credential
//! each outgoing request carries, and how those credentials are obtained.
//!
//! ## Components
//!
//! - **[`CredentialStore`]**: token per identity class (`general`, `admin`)
//!   plus the active identity. Injected, never global.
//! - **[`CredentialInterceptor`]**: request middleware that attaches the
//!   right `Cookie` header, honoring login paths, caller-supplied cookies,
//!   and per-call opt-outs.
//! - **[`SessionCoordinator`]**: acquires each identity's session exactly
//!   once (register-if-needed, sign in, extract cookie) and lets any number
//!   of concurrent tests await the shared outcome.
//!
//! ## Dependency Order
//!
//! ```text
//! CredentialStore ◄── CredentialInterceptor (reads)
//!        ▲
//!        └────────── SessionCoordinator (writes) ──► SignInProvider / RegistrationProvider
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use shopcheck_auth::*;
//!
//! let store = CredentialStore::new();
//! let client = ApiClient::new(transport).with_middleware(CredentialInterceptor::new(store.clone()));
//! let api = HttpMemberApi::new(client.clone());
//! let sessions = SessionCoordinator::new(store, SessionConfig::from_env(), api.clone(), api);
//!
//! sessions.ensure_ready(IdentityClass::General).await?;
//! let me = client.execute(ApiRequest::get("/api/members/me")).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod constants;
pub mod cookie;
pub mod coordinator;
pub mod error;
pub mod identity;
pub mod interceptor;
pub mod providers;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use config::{AccountConfig, SessionConfig};
pub use cookie::extract_credential_value;
pub use coordinator::{SessionCoordinator, TestAccount};
pub use error::{AuthError, Result};
pub use identity::IdentityClass;
pub use interceptor::{CredentialInterceptor, IdentityRequestExt, InterceptorConfig, SkipAutoCredential};
pub use providers::{HttpMemberApi, RegistrationProvider, SignInProvider};
pub use store::CredentialStore;
