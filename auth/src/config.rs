//! Session configuration.
//!
//! Test accounts come from the environment. The general identity may be left
//! unconfigured (a throwaway member is registered instead); the admin
//! identity must be pre-provisioned.

use crate::constants::env;
use crate::identity::IdentityClass;

/// Default email domain for self-registered accounts.
pub const DEFAULT_EMAIL_DOMAIN: &str = "example.test";

/// Fixed account settings for one identity class.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccountConfig {
    /// Login identity (email)
    pub identity: Option<String>,
    /// Login secret (password)
    pub secret: Option<String>,
    /// Display name used in registration and assertions
    pub display_name: Option<String>,
}

impl AccountConfig {
    /// Fixed account with identity and secret.
    #[must_use]
    pub fn fixed(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            secret: Some(secret.into()),
            display_name: None,
        }
    }

    /// Set display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// `true` when both identity and secret are present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.identity.is_some() && self.secret.is_some()
    }
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("identity", &self.identity)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Settings for every identity class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// General member account (optional; self-registers when incomplete)
    pub general: AccountConfig,
    /// Admin account (required)
    pub admin: AccountConfig,
    /// Fallback credential served for the general identity
    pub fallback_credential: Option<String>,
    /// Email domain for self-registered accounts
    pub email_domain: String,
}

impl SessionConfig {
    /// Create configuration with no fixed accounts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            general: AccountConfig::default(),
            admin: AccountConfig::default(),
            fallback_credential: None,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
        }
    }

    /// Read configuration from process environment variables.
    ///
    /// See [`constants::env`](crate::constants::env) for the variable names.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            general: AccountConfig {
                identity: get(env::GENERAL_IDENTITY),
                secret: get(env::GENERAL_SECRET),
                display_name: get(env::GENERAL_DISPLAY_NAME),
            },
            admin: AccountConfig {
                identity: get(env::ADMIN_IDENTITY),
                secret: get(env::ADMIN_SECRET),
                display_name: get(env::ADMIN_DISPLAY_NAME),
            },
            fallback_credential: get(env::FALLBACK_CREDENTIAL),
            email_domain: get(env::EMAIL_DOMAIN)
                .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string()),
        }
    }

    /// Set the general account.
    #[must_use]
    pub fn with_general(mut self, account: AccountConfig) -> Self {
        self.general = account;
        self
    }

    /// Set the admin account.
    #[must_use]
    pub fn with_admin(mut self, account: AccountConfig) -> Self {
        self.admin = account;
        self
    }

    /// Set the fallback credential.
    #[must_use]
    pub fn with_fallback_credential(mut self, token: impl Into<String>) -> Self {
        self.fallback_credential = Some(token.into());
        self
    }

    /// Set the email domain for self-registered accounts.
    #[must_use]
    pub fn with_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.email_domain = domain.into();
        self
    }

    /// Account settings for `identity`.
    #[must_use]
    pub const fn account(&self, identity: IdentityClass) -> &AccountConfig {
        match identity {
            IdentityClass::General => &self.general,
            IdentityClass::Admin => &self.admin,
        }
    }

    /// Environment variable names `(identity, secret)` for `identity`, used in
    /// configuration error messages.
    #[must_use]
    pub const fn variable_names(identity: IdentityClass) -> (&'static str, &'static str) {
        match identity {
            IdentityClass::General => (env::GENERAL_IDENTITY, env::GENERAL_SECRET),
            IdentityClass::Admin => (env::ADMIN_IDENTITY, env::ADMIN_SECRET),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
