//! Credential interceptor middleware.
//!
//! Runs before every outgoing request and decides whether to attach a
//! `Cookie` header, and for which identity.
//!
//! # Decision Order
//!
//! 1. **Strip** transient headers (`x-auth-identity`, `x-skip-auto-credential`)
//! 2. **Resolve** the identity: per-call selector, else the store's active identity
//! 3. **No token** for that identity → pass through (unauthenticated request)
//! 4. **Login path** → pass through (never replay a stale session into a login)
//! 5. **Caller-supplied `Cookie`** → pass through (explicit wins)
//! 6. **Opt-out flag** → pass through
//! 7. **Attach** the normalized token as `Cookie`
//!
//! The interceptor never fails: every branch yields a request.

use crate::constants::{headers, paths};
use crate::cookie::normalize_credential;
use crate::identity::IdentityClass;
use crate::store::CredentialStore;
use http::header::{COOKIE, HeaderMap, HeaderValue};
use shopcheck_core::{ApiRequest, Middleware};

/// Per-call opt-out of automatic credential attachment.
///
/// Insert with [`IdentityRequestExt::without_auto_credential`] or
/// [`ApiRequest::extension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipAutoCredential(pub bool);

/// Per-call identity options on [`ApiRequest`].
pub trait IdentityRequestExt: Sized {
    /// Authenticate this call as `identity` regardless of the active identity.
    #[must_use]
    fn as_identity(self, identity: IdentityClass) -> Self;

    /// Send this call without an automatically attached credential.
    #[must_use]
    fn without_auto_credential(self) -> Self;
}

impl IdentityRequestExt for ApiRequest {
    fn as_identity(mut self, identity: IdentityClass) -> Self {
        self.headers.insert(
            headers::IDENTITY_SELECTOR,
            HeaderValue::from_static(identity.as_str()),
        );
        self
    }

    fn without_auto_credential(self) -> Self {
        self.extension(SkipAutoCredential(true))
    }
}

/// Interceptor settings.
#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    /// Path segments (lowercase) that identify a login endpoint.
    ///
    /// A marker matches whole segments: `login` matches `/api/auth/login`
    /// but not `/api/members/login-history`. Markers may span several
    /// segments (`session/new`).
    pub login_path_markers: Vec<String>,
}

impl InterceptorConfig {
    /// Add a login path marker.
    #[must_use]
    pub fn with_login_marker(mut self, marker: impl Into<String>) -> Self {
        self.login_path_markers.push(marker.into().to_ascii_lowercase());
        self
    }
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            login_path_markers: paths::LOGIN_MARKERS
                .iter()
                .map(|marker| (*marker).to_string())
                .collect(),
        }
    }
}

/// Attaches stored credentials to outgoing requests.
///
/// # Example
///
/// ```ignore
/// let store = CredentialStore::new();
/// let client = ApiClient::new(transport)
///     .with_middleware(CredentialInterceptor::new(store.clone()));
///
/// store.set_credential(IdentityClass::General, Some("sid=abc123".into()));
/// client.execute(ApiRequest::get("/api/members/me")).await?; // Cookie: sid=abc123
/// ```
#[derive(Debug, Clone)]
pub struct CredentialInterceptor {
    store: CredentialStore,
    config: InterceptorConfig,
}

impl CredentialInterceptor {
    /// Create an interceptor reading from `store`.
    #[must_use]
    pub fn new(store: CredentialStore) -> Self {
        Self::with_config(store, InterceptorConfig::default())
    }

    /// Create an interceptor with explicit settings.
    #[must_use]
    pub const fn with_config(store: CredentialStore, config: InterceptorConfig) -> Self {
        Self { store, config }
    }

    /// Store this interceptor reads from.
    #[must_use]
    pub const fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Rewrite one request. See the module docs for the decision order.
    #[must_use]
    pub fn intercept(&self, mut request: ApiRequest) -> ApiRequest {
        let selected = take_identity_selector(&mut request.headers);
        let skip_header = request
            .headers
            .remove(headers::SKIP_AUTO_CREDENTIAL)
            .is_some_and(|value| is_true(&value));

        let Some(identity) = selected.or_else(|| self.store.active_identity()) else {
            return request;
        };
        let Some(token) = self.store.get_credential(Some(identity)) else {
            tracing::debug!(%identity, path = %request.path, "no credential stored; sending unauthenticated");
            return request;
        };

        if self.is_login_path(&request.path) {
            tracing::debug!(path = %request.path, "login endpoint; credential withheld");
            return request;
        }
        if request.headers.contains_key(COOKIE) {
            tracing::debug!(path = %request.path, "caller supplied Cookie; left untouched");
            return request;
        }
        let skip_extension = request
            .extensions
            .get::<SkipAutoCredential>()
            .is_some_and(|skip| skip.0);
        if skip_header || skip_extension {
            tracing::debug!(path = %request.path, "auto credential skipped by caller");
            return request;
        }

        let Some(cookie) = normalize_credential(&token) else {
            tracing::warn!(%identity, "stored credential is unusable; sending unauthenticated");
            return request;
        };
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                request.headers.insert(COOKIE, value);
                tracing::debug!(%identity, path = %request.path, "credential attached");
            }
            Err(_) => {
                tracing::warn!(%identity, "stored credential is not a valid header value");
            }
        }
        request
    }

    /// `true` if `path` targets a login endpoint.
    ///
    /// Query and fragment are ignored; markers must match whole segments.
    #[must_use]
    pub fn is_login_path(&self, path: &str) -> bool {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let segments = path_segments(&path);

        self.config.login_path_markers.iter().any(|marker| {
            let wanted = path_segments(marker);
            !wanted.is_empty()
                && segments
                    .windows(wanted.len())
                    .any(|window| window == wanted.as_slice())
        })
    }
}

impl Middleware for CredentialInterceptor {
    fn name(&self) -> &'static str {
        "credential-interceptor"
    }

    fn before_send(&self, request: ApiRequest) -> ApiRequest {
        self.intercept(request)
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn take_identity_selector(map: &mut HeaderMap) -> Option<IdentityClass> {
    let raw = map.remove(headers::IDENTITY_SELECTOR)?;
    let parsed = raw.to_str().ok().and_then(|value| value.parse().ok());
    if parsed.is_none() {
        tracing::warn!(selector = ?raw, "unrecognised identity selector; using active identity");
    }
    parsed
}

fn is_true(value: &HeaderValue) -> bool {
    value
        .to_str()
        .is_ok_and(|value| value.trim().eq_ignore_ascii_case("true"))
}
