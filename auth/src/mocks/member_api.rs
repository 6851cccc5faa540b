//! Mock member API for testing.

use crate::error::Result;
use crate::providers::{
    Registration, RegistrationProvider, RegistrationRequest, SignInOutcome, SignInProvider,
    SignInRequest,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// First member id handed out by [`MockMemberApi`].
pub const FIRST_MEMBER_ID: i64 = 1001;

/// In-memory backend implementing both sign-in and registration.
///
/// Registered accounts can sign in afterwards. Every call is recorded before
/// any configured latency elapses, so counters reflect attempts, not
/// completions.
///
/// # Example
///
/// ```
/// # use shopcheck_auth::mocks::MockMemberApi;
/// let api = MockMemberApi::new().with_account("admin@shop.test", "pw");
/// assert_eq!(api.sign_in_calls(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockMemberApi {
    state: Arc<Mutex<MockState>>,
    latency: Option<Duration>,
}

#[derive(Debug)]
struct MockState {
    accounts: HashMap<String, String>,
    sign_ins: Vec<SignInRequest>,
    registrations: Vec<RegistrationRequest>,
    next_id: i64,
    sign_in_status: Option<u16>,
    registration_status: Option<u16>,
    issue_cookie: bool,
}

impl MockMemberApi {
    /// Create a backend with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                accounts: HashMap::new(),
                sign_ins: Vec::new(),
                registrations: Vec::new(),
                next_id: FIRST_MEMBER_ID,
                sign_in_status: None,
                registration_status: None,
                issue_cookie: true,
            })),
            latency: None,
        }
    }

    /// Seed an existing account.
    #[must_use]
    pub fn with_account(self, identity: &str, secret: &str) -> Self {
        self.lock()
            .accounts
            .insert(identity.to_string(), secret.to_string());
        self
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer every sign-in with `status`.
    #[must_use]
    pub fn reject_sign_in_with(self, status: u16) -> Self {
        self.lock().sign_in_status = Some(status);
        self
    }

    /// Answer every registration with `status`.
    #[must_use]
    pub fn reject_registration_with(self, status: u16) -> Self {
        self.lock().registration_status = Some(status);
        self
    }

    /// Succeed sign-ins without issuing a cookie.
    #[must_use]
    pub fn without_issued_cookie(self) -> Self {
        self.lock().issue_cookie = false;
        self
    }

    /// Number of sign-in attempts.
    #[must_use]
    pub fn sign_in_calls(&self) -> usize {
        self.lock().sign_ins.len()
    }

    /// Number of registration attempts.
    #[must_use]
    pub fn registration_calls(&self) -> usize {
        self.lock().registrations.len()
    }

    /// Identities used in sign-in attempts, in order.
    #[must_use]
    pub fn signed_in_identities(&self) -> Vec<String> {
        self.lock()
            .sign_ins
            .iter()
            .map(|request| request.identity.clone())
            .collect()
    }

    /// Registration requests, in order.
    #[must_use]
    pub fn registrations(&self) -> Vec<RegistrationRequest> {
        self.lock().registrations.clone()
    }

    /// Cookie issued to `identity` on a successful sign-in.
    #[must_use]
    pub fn session_cookie_for(identity: &str) -> String {
        let local = identity.split('@').next().unwrap_or_default();
        format!("sid={local}")
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(latency: Option<Duration>) {
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for MockMemberApi {
    fn default() -> Self {
        Self::new()
    }
}

impl SignInProvider for MockMemberApi {
    fn sign_in(
        &self,
        request: &SignInRequest,
    ) -> impl Future<Output = Result<SignInOutcome>> + Send {
        let outcome = {
            let mut state = self.lock();
            state.sign_ins.push(request.clone());

            let known = state.accounts.get(&request.identity) == Some(&request.secret);
            match state.sign_in_status {
                Some(status) => SignInOutcome {
                    status,
                    ..SignInOutcome::default()
                },
                None if known && state.issue_cookie => SignInOutcome {
                    status: 200,
                    issued: vec![format!(
                        "{}; Path=/; HttpOnly",
                        Self::session_cookie_for(&request.identity)
                    )],
                    token: None,
                },
                None if known => SignInOutcome {
                    status: 200,
                    ..SignInOutcome::default()
                },
                None => SignInOutcome {
                    status: 401,
                    ..SignInOutcome::default()
                },
            }
        };
        let latency = self.latency;

        async move {
            Self::delay(latency).await;
            Ok(outcome)
        }
    }
}

impl RegistrationProvider for MockMemberApi {
    fn register(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = Result<Registration>> + Send {
        let registration = {
            let mut state = self.lock();
            state.registrations.push(request.clone());

            if let Some(status) = state.registration_status {
                Registration {
                    status,
                    ..Registration::default()
                }
            } else if state.accounts.contains_key(&request.identity) {
                Registration {
                    status: 409,
                    ..Registration::default()
                }
            } else {
                let id = state.next_id;
                state.next_id += 1;
                state
                    .accounts
                    .insert(request.identity.clone(), request.secret.clone());
                Registration {
                    status: 201,
                    location: Some(format!("/api/members/{id}")),
                    member_id: Some(id),
                }
            }
        };
        let latency = self.latency;

        async move {
            Self::delay(latency).await;
            Ok(registration)
        }
    }
}
