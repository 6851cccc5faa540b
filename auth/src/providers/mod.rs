//! External collaborators used during session acquisition.
//!
//! The coordinator never talks HTTP itself. It depends on two traits:
//!
//! - [`SignInProvider`]: exchanges identity + secret for a session credential
//! - [`RegistrationProvider`]: creates a throwaway member account
//!
//! Providers report what the backend said (status, issued cookies, ids) and
//! fail only when no response arrived. Deciding whether a 401 is fatal is the
//! coordinator's job.
//!
//! This enables:
//! - **Unit tests**: in-memory mocks with call counters (`mocks` module)
//! - **Contract tests**: [`HttpMemberApi`] over a recording mock transport
//! - **Integration runs**: [`HttpMemberApi`] over a live server

use crate::cookie::extract_credential_value;
use crate::error::Result;
use std::fmt;
use std::future::Future;

pub mod member_api;

pub use member_api::HttpMemberApi;

/// Sign-in input.
#[derive(Clone, PartialEq, Eq)]
pub struct SignInRequest {
    /// Login identity (email)
    pub identity: String,
    /// Login secret (password)
    pub secret: String,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// What the sign-in endpoint answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInOutcome {
    /// HTTP status
    pub status: u16,
    /// Raw credential-issuance header values (`Set-Cookie`)
    pub issued: Vec<String>,
    /// Credential returned in the body, if any
    pub token: Option<String>,
}

impl SignInOutcome {
    /// `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Replayable credential: issued cookies first, then the body token.
    #[must_use]
    pub fn credential(&self) -> Option<String> {
        extract_credential_value(&self.issued).or_else(|| {
            self.token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
        })
    }
}

/// Registration input.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Member display name
    pub display_name: String,
    /// Login identity (email)
    pub identity: String,
    /// Login secret (password)
    pub secret: String,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("display_name", &self.display_name)
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// What the registration endpoint answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// HTTP status
    pub status: u16,
    /// Created-resource location, if returned
    pub location: Option<String>,
    /// Numeric member id, if one could be determined
    pub member_id: Option<i64>,
}

impl Registration {
    /// `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sign-in collaborator.
pub trait SignInProvider: Send + Sync {
    /// Attempt to sign in.
    ///
    /// A rejected sign-in is an `Ok` outcome with a non-2xx status.
    ///
    /// # Errors
    ///
    /// Returns error if no response arrived (transport failure).
    fn sign_in(
        &self,
        request: &SignInRequest,
    ) -> impl Future<Output = Result<SignInOutcome>> + Send;
}

/// Member-registration collaborator.
pub trait RegistrationProvider: Send + Sync {
    /// Register a new member.
    ///
    /// A refused registration is an `Ok` outcome with a non-2xx status.
    ///
    /// # Errors
    ///
    /// Returns error if no response arrived (transport failure).
    fn register(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = Result<Registration>> + Send;
}
