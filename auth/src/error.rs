//! Error types for session acquisition.

use crate::identity::IdentityClass;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failures raised while acquiring a session for an identity class.
///
/// Missing credentials are never errors at the interceptor level; an absent
/// token simply means "send the request unauthenticated". These errors are
/// raised only by the [`SessionCoordinator`](crate::coordinator::SessionCoordinator)
/// and are shared by every caller awaiting the same identity class, hence
/// `Clone`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════

    /// A required environment value is absent and the identity may not
    /// self-register.
    #[error("Missing configuration for {identity} identity: {variable} is not set")]
    Configuration {
        /// Identity being acquired
        identity: IdentityClass,
        /// Name of the missing variable
        variable: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Acquisition Errors
    // ═══════════════════════════════════════════════════════════

    /// Sign-in answered with a non-success status.
    #[error("Sign-in for {identity} identity failed with HTTP status {status}")]
    SignInRejected {
        /// Identity being acquired
        identity: IdentityClass,
        /// HTTP status returned by the sign-in endpoint
        status: u16,
    },

    /// Sign-in succeeded but carried no extractable credential.
    #[error("Sign-in for {identity} identity returned no session credential")]
    MissingCredential {
        /// Identity being acquired
        identity: IdentityClass,
    },

    /// Member registration failed.
    #[error("Registration for {identity} identity failed: {reason}")]
    RegistrationFailed {
        /// Identity being acquired
        identity: IdentityClass,
        /// Status or transport failure description
        reason: String,
    },

    /// Transport failed before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    // ═══════════════════════════════════════════════════════════
    // Usage Errors
    // ═══════════════════════════════════════════════════════════

    /// Account requested before its session was acquired.
    #[error("Session for {0} identity is not ready; await ensure_ready first")]
    NotReady(IdentityClass),
}

impl AuthError {
    /// Returns `true` for missing-configuration failures.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shopcheck_auth::{AuthError, IdentityClass};
    /// let error = AuthError::Configuration {
    ///     identity: IdentityClass::Admin,
    ///     variable: "ADMIN_SECRET".to_string(),
    /// };
    /// assert!(error.is_configuration());
    /// assert!(!error.is_acquisition());
    /// ```
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns `true` when the backend refused or failed the acquisition.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shopcheck_auth::{AuthError, IdentityClass};
    /// let error = AuthError::SignInRejected { identity: IdentityClass::General, status: 401 };
    /// assert!(error.is_acquisition());
    /// ```
    #[must_use]
    pub const fn is_acquisition(&self) -> bool {
        matches!(
            self,
            Self::SignInRejected { .. }
                | Self::MissingCredential { .. }
                | Self::RegistrationFailed { .. }
                | Self::Transport(_)
        )
    }
}

impl From<shopcheck_core::TransportError> for AuthError {
    fn from(error: shopcheck_core::TransportError) -> Self {
        Self::Transport(error.to_string())
    }
}
