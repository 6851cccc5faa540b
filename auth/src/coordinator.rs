//! One-shot session acquisition per identity class.
//!
//! # Flow
//!
//! ```text
//! ensure_ready(k) ──► slot[k] ──(first caller only)──► acquire(k)
//!                        │                                    │
//!                        │          fixed account? ──yes──► sign in ──rejected──► register once ──► sign in
//!                        │               │no                  │ok
//!                        │          may self-register? ──no──► Configuration error
//!                        │               │yes
//!                        │          register throwaway ──► sign in
//!                        │                                    │
//!                        ◄──────── memoized Result ◄──────────┘  (credential stored on success)
//! ```
//!
//! Each identity class has its own slot, so general and admin acquisitions
//! run independently. A slot holds one shared acquisition future and, once it
//! resolves, its outcome (success or failure) for the lifetime of the
//! coordinator: later callers never trigger a second attempt, and a cancelled
//! caller never abandons one.

use crate::config::SessionConfig;
use crate::error::{AuthError, Result};
use crate::identity::IdentityClass;
use crate::providers::{
    Registration, RegistrationProvider, RegistrationRequest, SignInProvider, SignInRequest,
};
use crate::store::CredentialStore;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Length of generated secrets for throwaway accounts.
const GENERATED_SECRET_LEN: usize = 20;

/// Test account an identity class is signed in as.
#[derive(Clone, PartialEq, Eq)]
pub struct TestAccount {
    /// Login identity (email); compare against response `email` fields
    pub identity: String,
    /// Login secret
    pub secret: String,
    /// Display name
    pub display_name: String,
    /// Member id, known when the account was registered by this run
    pub numeric_id: Option<i64>,
}

impl fmt::Debug for TestAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestAccount")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("numeric_id", &self.numeric_id)
            .finish()
    }
}

/// Acquisition shared by every waiter of one identity class.
///
/// The future is owned by the coordinator, not by whichever caller polls it
/// first, so a dropped waiter never discards an attempt in flight.
type Acquisition = Shared<BoxFuture<'static, Result<TestAccount>>>;

type Slot = Mutex<Option<Acquisition>>;

struct Inner<S, R> {
    store: CredentialStore,
    config: SessionConfig,
    sign_in: S,
    registration: R,
    general: Slot,
    admin: Slot,
}

/// Acquires and publishes one session per identity class.
///
/// Clones share the memoized outcomes, so a single coordinator can be handed
/// to every test in a run.
///
/// # Example
///
/// ```ignore
/// let coordinator = SessionCoordinator::new(store.clone(), SessionConfig::from_env(), api.clone(), api);
///
/// coordinator.ensure_ready(IdentityClass::General).await?;
/// let member = coordinator.account(IdentityClass::General)?;
/// assert_eq!(profile["email"], member.identity);
/// ```
pub struct SessionCoordinator<S, R> {
    inner: Arc<Inner<S, R>>,
}

impl<S, R> Clone for SessionCoordinator<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, R> fmt::Debug for SessionCoordinator<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("config", &self.inner.config)
            .field("general_settled", &settled(&self.inner.general).is_some())
            .field("admin_settled", &settled(&self.inner.admin).is_some())
            .finish_non_exhaustive()
    }
}

impl<S, R> SessionCoordinator<S, R>
where
    S: SignInProvider + 'static,
    R: RegistrationProvider + 'static,
{
    /// Create a coordinator that publishes credentials into `store`.
    #[must_use]
    pub fn new(store: CredentialStore, config: SessionConfig, sign_in: S, registration: R) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                config,
                sign_in,
                registration,
                general: Mutex::new(None),
                admin: Mutex::new(None),
            }),
        }
    }

    /// Store credentials are published to.
    #[must_use]
    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Acquire a session for `identity` unless one was already attempted.
    ///
    /// Concurrent callers share a single attempt and all observe its outcome.
    /// Dropping a caller (timeout, `select!`, aborted task) does not cancel
    /// the attempt; the next caller resumes it.
    ///
    /// # Errors
    ///
    /// Returns (to every caller) the error of the single attempt:
    /// - [`AuthError::Configuration`]: required account settings are missing
    /// - [`AuthError::SignInRejected`]: sign-in answered non-2xx
    /// - [`AuthError::MissingCredential`]: sign-in carried no credential
    /// - [`AuthError::RegistrationFailed`]: throwaway registration was refused
    /// - [`AuthError::Transport`]: no response arrived
    pub async fn ensure_ready(&self, identity: IdentityClass) -> Result<()> {
        let acquisition = {
            let mut slot = lock(self.inner.slot(identity));
            slot.get_or_insert_with(|| {
                let inner = Arc::clone(&self.inner);
                async move { inner.acquire(identity).await }.boxed().shared()
            })
            .clone()
        };
        acquisition.await.map(|_| ())
    }

    /// Wait for the session of `identity`, starting acquisition if needed.
    ///
    /// # Errors
    ///
    /// Same as [`SessionCoordinator::ensure_ready`].
    pub async fn wait_for_ready(&self, identity: IdentityClass) -> Result<()> {
        self.ensure_ready(identity).await
    }

    /// `true` once `identity` has a successfully acquired session.
    #[must_use]
    pub fn is_ready(&self, identity: IdentityClass) -> bool {
        matches!(settled(self.inner.slot(identity)), Some(Ok(_)))
    }

    /// Account `identity` is signed in as.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotReady`] before acquisition settles, or the
    /// acquisition error if it failed.
    pub fn account(&self, identity: IdentityClass) -> Result<TestAccount> {
        settled(self.inner.slot(identity)).unwrap_or(Err(AuthError::NotReady(identity)))
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Acquisition>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of a finished acquisition, `None` while absent or in flight.
fn settled(slot: &Slot) -> Option<Result<TestAccount>> {
    lock(slot).as_ref().and_then(Shared::peek).cloned()
}

impl<S: SignInProvider, R: RegistrationProvider> Inner<S, R> {
    const fn slot(&self, identity: IdentityClass) -> &Slot {
        match identity {
            IdentityClass::General => &self.general,
            IdentityClass::Admin => &self.admin,
        }
    }

    async fn acquire(&self, identity: IdentityClass) -> Result<TestAccount> {
        tracing::info!(%identity, "acquiring session");
        let settings = self.config.account(identity);

        let result = match (&settings.identity, &settings.secret) {
            (Some(login), Some(secret)) => {
                let account = TestAccount {
                    identity: login.clone(),
                    secret: secret.clone(),
                    display_name: settings
                        .display_name
                        .clone()
                        .unwrap_or_else(|| login.clone()),
                    numeric_id: None,
                };
                self.acquire_fixed(identity, account).await
            }
            _ if identity.allows_self_registration() => self.acquire_registered(identity).await,
            (login, _) => {
                let (identity_var, secret_var) = SessionConfig::variable_names(identity);
                let variable = if login.is_none() { identity_var } else { secret_var };
                Err(AuthError::Configuration {
                    identity,
                    variable: variable.to_string(),
                })
            }
        };

        match &result {
            Ok(account) => tracing::info!(
                %identity,
                account = %account.identity,
                member_id = ?account.numeric_id,
                "session ready"
            ),
            Err(error) => tracing::warn!(%identity, %error, "session acquisition failed"),
        }
        result
    }

    async fn acquire_fixed(
        &self,
        identity: IdentityClass,
        mut account: TestAccount,
    ) -> Result<TestAccount> {
        let first_attempt = self.sign_in(identity, &account).await;
        match first_attempt {
            Err(rejected @ AuthError::SignInRejected { status, .. })
                if identity.allows_self_registration() =>
            {
                tracing::warn!(%identity, status, "fixed account rejected; registering it once");
                // A refused registration (typically 409: the account exists with
                // another secret) leaves the sign-in status as the real cause.
                let registration = match self.register(identity, &account).await {
                    Ok(registration) => registration,
                    Err(error) => {
                        tracing::warn!(%identity, %error, "fallback registration failed");
                        return Err(rejected);
                    }
                };
                account.numeric_id = registration.member_id;
                self.sign_in(identity, &account).await?;
                Ok(account)
            }
            other => other.map(|()| account),
        }
    }

    async fn acquire_registered(&self, identity: IdentityClass) -> Result<TestAccount> {
        let mut account = self.throwaway_account(identity);
        let registration = self.register(identity, &account).await?;
        account.numeric_id = registration.member_id;
        self.sign_in(identity, &account).await?;
        Ok(account)
    }

    async fn sign_in(&self, identity: IdentityClass, account: &TestAccount) -> Result<()> {
        let outcome = self
            .sign_in
            .sign_in(&SignInRequest {
                identity: account.identity.clone(),
                secret: account.secret.clone(),
            })
            .await?;

        if !outcome.is_success() {
            return Err(AuthError::SignInRejected {
                identity,
                status: outcome.status,
            });
        }
        let credential = outcome
            .credential()
            .ok_or(AuthError::MissingCredential { identity })?;

        self.store.set_credential(identity, Some(credential));
        Ok(())
    }

    async fn register(&self, identity: IdentityClass, account: &TestAccount) -> Result<Registration> {
        let registration = self
            .registration
            .register(&RegistrationRequest {
                display_name: account.display_name.clone(),
                identity: account.identity.clone(),
                secret: account.secret.clone(),
            })
            .await
            .map_err(|error| AuthError::RegistrationFailed {
                identity,
                reason: error.to_string(),
            })?;

        if registration.is_success() {
            tracing::debug!(%identity, member_id = ?registration.member_id, "member registered");
            Ok(registration)
        } else {
            Err(AuthError::RegistrationFailed {
                identity,
                reason: format!("HTTP status {}", registration.status),
            })
        }
    }

    fn throwaway_account(&self, identity: IdentityClass) -> TestAccount {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let secret: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_SECRET_LEN)
            .map(char::from)
            .collect();
        let short = &suffix[..8];

        TestAccount {
            identity: format!("{identity}-{suffix}@{}", self.config.email_domain),
            secret: format!("Pw1-{secret}"),
            display_name: self
                .config
                .account(identity)
                .display_name
                .clone()
                .unwrap_or_else(|| format!("Test {identity} {short}")),
            numeric_id: None,
        }
    }
}
