//! Authentication constants.
//!
//! Header names, API paths, and environment variable names shared by the
//! interceptor, the coordinator, and the HTTP collaborators.

/// Transient headers consumed by the credential interceptor.
///
/// Neither header ever reaches the transport.
pub mod headers {
    /// Per-call identity selector (`general` / `admin`).
    pub const IDENTITY_SELECTOR: &str = "x-auth-identity";

    /// Per-call opt-out of automatic credential attachment (`true`).
    pub const SKIP_AUTO_CREDENTIAL: &str = "x-skip-auto-credential";
}

/// Backend paths used during session acquisition.
pub mod paths {
    /// Sign-in endpoint.
    pub const SIGN_IN: &str = "/api/auth/login";

    /// Member registration endpoint.
    pub const MEMBERS: &str = "/api/members";

    /// Default path segments that mark a login endpoint.
    pub const LOGIN_MARKERS: [&str; 3] = ["login", "sign-in", "signin"];
}

/// Environment variables read by [`SessionConfig::from_env`](crate::config::SessionConfig::from_env).
pub mod env {
    /// Fixed general account identity (email).
    pub const GENERAL_IDENTITY: &str = "GENERAL_IDENTITY";
    /// Fixed general account secret.
    pub const GENERAL_SECRET: &str = "GENERAL_SECRET";
    /// Fixed general account display name.
    pub const GENERAL_DISPLAY_NAME: &str = "GENERAL_DISPLAY_NAME";

    /// Admin account identity (email). Required.
    pub const ADMIN_IDENTITY: &str = "ADMIN_IDENTITY";
    /// Admin account secret. Required.
    pub const ADMIN_SECRET: &str = "ADMIN_SECRET";
    /// Admin account display name.
    pub const ADMIN_DISPLAY_NAME: &str = "ADMIN_DISPLAY_NAME";

    /// Process-wide fallback credential for the general identity.
    pub const FALLBACK_CREDENTIAL: &str = "AUTH_COOKIE";

    /// Email domain for self-registered accounts.
    pub const EMAIL_DOMAIN: &str = "TEST_EMAIL_DOMAIN";
}
