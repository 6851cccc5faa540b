//! Wiring of store, client, and coordinator for a test run.

use crate::mock_transport::MockTransport;
use shopcheck_auth::{
    AuthError, CredentialInterceptor, CredentialStore, HttpMemberApi, IdentityClass,
    IdentityRequestExt, SessionConfig, SessionCoordinator, TestAccount,
};
use shopcheck_core::{ApiClient, ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};
use std::sync::OnceLock;

/// Coordinator type driven over HTTP by a [`TestContext`].
pub type HttpCoordinator<T> = SessionCoordinator<HttpMemberApi<T>, HttpMemberApi<T>>;

/// Everything a contract test needs: one store, one intercepted client, and
/// one coordinator publishing into that store.
///
/// # Example
///
/// ```ignore
/// let ctx = shopcheck_testing::live_context()?;
/// ctx.ensure_ready(IdentityClass::General).await?;
///
/// let me = ctx.send(ApiRequest::get("/api/members/me")).await?;
/// assert_eq!(me.json::<Value>()?["email"], ctx.account(IdentityClass::General)?.identity);
/// ```
#[derive(Debug, Clone)]
pub struct TestContext<T> {
    client: ApiClient<T>,
    store: CredentialStore,
    coordinator: HttpCoordinator<T>,
}

impl<T: Transport + Clone + 'static> TestContext<T> {
    /// Wire a context over `transport`.
    ///
    /// The configured fallback credential is loaded into the store.
    #[must_use]
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let store = CredentialStore::new().with_fallback_credential(config.fallback_credential.clone());
        let client =
            ApiClient::new(transport).with_middleware(CredentialInterceptor::new(store.clone()));
        let api = HttpMemberApi::new(client.clone());
        let coordinator = SessionCoordinator::new(store.clone(), config, api.clone(), api);

        Self {
            client,
            store,
            coordinator,
        }
    }

    /// Client with the credential interceptor registered.
    #[must_use]
    pub const fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Shared credential store.
    #[must_use]
    pub const fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Session coordinator.
    #[must_use]
    pub const fn coordinator(&self) -> &HttpCoordinator<T> {
        &self.coordinator
    }

    /// Acquire (or await) the session for `identity`.
    ///
    /// # Errors
    ///
    /// Returns the memoized acquisition error; see
    /// [`SessionCoordinator::ensure_ready`].
    pub async fn ensure_ready(&self, identity: IdentityClass) -> Result<(), AuthError> {
        self.coordinator.ensure_ready(identity).await
    }

    /// Account `identity` is signed in as.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotReady`] before acquisition, or the acquisition
    /// error.
    pub fn account(&self, identity: IdentityClass) -> Result<TestAccount, AuthError> {
        self.coordinator.account(identity)
    }

    /// Send `request` through the interceptor as the active identity.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response arrives.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.client.execute(request).await
    }

    /// Send `request` as `identity`, leaving the active identity untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response arrives.
    pub async fn send_as(
        &self,
        identity: IdentityClass,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        self.client.execute(request.as_identity(identity)).await
    }

    /// Send `request` without any automatic credential.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response arrives.
    pub async fn send_anonymous(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.client.execute(request.without_auto_credential()).await
    }

    /// Context sharing this one's sessions and coordinator, with its own
    /// active identity.
    ///
    /// Switching the active identity on the fork never changes which
    /// identity other forks send as.
    #[must_use]
    pub fn fork(&self) -> Self {
        let store = self.store.with_own_active_identity();
        let client = ApiClient::new(self.client.transport().clone())
            .with_middleware(CredentialInterceptor::new(store.clone()));

        Self {
            client,
            store,
            coordinator: self.coordinator.clone(),
        }
    }

    /// Put the active identity back to `general`.
    ///
    /// Tests that switch the active identity call this before finishing.
    pub fn reset_active_identity(&self) {
        self.store.set_active_identity(Some(IdentityClass::General));
    }
}

impl TestContext<MockTransport> {
    /// Context over a fresh [`MockTransport`], returned alongside it for
    /// routing and assertions.
    #[must_use]
    pub fn mock(config: SessionConfig) -> (Self, MockTransport) {
        let transport = MockTransport::new();
        (Self::new(transport.clone(), config), transport)
    }
}

impl TestContext<ReqwestTransport> {
    /// Context for the live server named by `API_BASE_URL`, with accounts
    /// from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidBaseUrl`] if `API_BASE_URL` is unset
    /// or malformed.
    pub fn live() -> Result<Self, TransportError> {
        let transport = ReqwestTransport::from_env()?;
        Ok(Self::new(transport, SessionConfig::from_env()))
    }
}

static LIVE: OnceLock<Result<TestContext<ReqwestTransport>, TransportError>> = OnceLock::new();

/// Live context over the process-wide sessions of this test binary.
///
/// Every call returns a [`TestContext::fork`] of one shared context: all
/// tests share one session per identity class, acquired by whichever test
/// asks first, while each test switches its active identity on its own.
///
/// # Errors
///
/// Returns the error from [`TestContext::live`], memoized.
pub fn live_context() -> Result<TestContext<ReqwestTransport>, TransportError> {
    LIVE.get_or_init(|| {
        crate::logging::init_test_tracing();
        TestContext::live()
    })
    .as_ref()
    .map(TestContext::fork)
    .map_err(Clone::clone)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock_transport::sign_in_response;
    use http::header::COOKIE;
    use shopcheck_core::Method;

    #[tokio::test]
    async fn test_fallback_credential_is_attached_without_sign_in() {
        let config = SessionConfig::new().with_fallback_credential("sid=preissued");
        let (ctx, transport) = TestContext::mock(config);

        ctx.send(ApiRequest::get("/api/carts")).await.unwrap();

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.header_str(COOKIE.as_str()), Some("sid=preissued"));
        assert!(!ctx.coordinator().is_ready(IdentityClass::General));
    }

    #[tokio::test]
    async fn test_admin_fixed_account_over_mock_transport() {
        let config = SessionConfig::new()
            .with_admin(shopcheck_auth::AccountConfig::fixed("admin@shop.test", "pw"));
        let (ctx, transport) = TestContext::mock(config);
        transport.set_route(Method::POST, "/api/auth/login", sign_in_response("sid=admin"));

        ctx.ensure_ready(IdentityClass::Admin).await.unwrap();

        assert_eq!(
            ctx.store().credential_for(IdentityClass::Admin),
            Some("sid=admin".to_string())
        );
        assert_eq!(transport.call_count("/api/members"), 0);
    }

    #[tokio::test]
    async fn test_fork_switches_identity_without_affecting_parent() {
        let (ctx, transport) = TestContext::mock(SessionConfig::new());
        let transport = transport.with_member_backend(9, "sid=member9");
        ctx.store()
            .set_credential(IdentityClass::Admin, Some("sid=admin".to_string()));
        let fork = ctx.fork();

        fork.store().set_active_identity(Some(IdentityClass::Admin));
        fork.ensure_ready(IdentityClass::General).await.unwrap();
        ctx.send(ApiRequest::get("/api/carts")).await.unwrap();
        fork.send(ApiRequest::get("/api/admin/orders")).await.unwrap();

        // Parent stays on general and sees the session the fork acquired
        assert!(ctx.coordinator().is_ready(IdentityClass::General));
        assert_eq!(ctx.store().active_identity(), Some(IdentityClass::General));
        let carts = transport.requests_to("/api/carts").pop().unwrap();
        let orders = transport.requests_to("/api/admin/orders").pop().unwrap();
        assert_eq!(carts.header_str(COOKIE.as_str()), Some("sid=member9"));
        assert_eq!(orders.header_str(COOKIE.as_str()), Some("sid=admin"));
    }
}
