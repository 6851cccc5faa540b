//! Shared credential state.

use crate::identity::IdentityClass;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Credential tokens per identity class, plus the ambient identity used when
/// a request does not pick one.
///
/// Cloning shares state. One store is owned by a test context and handed to
/// both the interceptor (reader) and the coordinator (writer).
/// [`CredentialStore::with_own_active_identity`] gives a handle that shares
/// tokens but keeps its own active identity, for tests running in parallel
/// against one set of sessions.
///
/// # Invariants
///
/// - At most one token per identity class; setting replaces, `None` clears
/// - The active identity defaults to [`IdentityClass::General`]
/// - No operation fails; an absent token means "logged out"
#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<RwLock<StoreState>>,
    active: Arc<RwLock<Option<IdentityClass>>>,
}

#[derive(Debug, Default)]
struct StoreState {
    tokens: HashMap<IdentityClass, String>,
    fallback: Option<String>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
            active: Arc::new(RwLock::new(Some(IdentityClass::General))),
        }
    }
}

impl CredentialStore {
    /// Create an empty store with `general` as the active identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `token` for the general identity whenever no general token is
    /// stored.
    #[must_use]
    pub fn with_fallback_credential(self, token: Option<String>) -> Self {
        self.write().fallback = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Handle sharing this store's tokens and fallback, with an active
    /// identity of its own (starting from this store's current one).
    ///
    /// Changing the active identity through either handle leaves the other
    /// untouched; token updates are visible through both.
    #[must_use]
    pub fn with_own_active_identity(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            active: Arc::new(RwLock::new(self.active_identity())),
        }
    }

    /// Store or clear the token for `identity`.
    pub fn set_credential(&self, identity: IdentityClass, token: Option<String>) {
        let mut state = self.write();
        match token {
            Some(token) => {
                state.tokens.insert(identity, token);
                tracing::debug!(%identity, "credential stored");
            }
            None => {
                state.tokens.remove(&identity);
                tracing::debug!(%identity, "credential cleared");
            }
        }
    }

    /// Clear the token for `identity`.
    pub fn clear(&self, identity: IdentityClass) {
        self.set_credential(identity, None);
    }

    /// Clear every stored token. The fallback and active identity are kept.
    pub fn clear_all(&self) {
        self.write().tokens.clear();
        tracing::debug!("all credentials cleared");
    }

    /// Change the identity used when a request does not select one.
    ///
    /// `None` attaches nothing by default.
    pub fn set_active_identity(&self, identity: Option<IdentityClass>) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = identity;
    }

    /// Identity used when a request does not select one.
    #[must_use]
    pub fn active_identity(&self) -> Option<IdentityClass> {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Token stored for exactly `identity`, ignoring the fallback.
    #[must_use]
    pub fn credential_for(&self, identity: IdentityClass) -> Option<String> {
        self.read().tokens.get(&identity).cloned()
    }

    /// Effective token for `identity`, or for the active identity when
    /// `identity` is `None`.
    ///
    /// The general identity falls back to the configured fallback credential.
    #[must_use]
    pub fn get_credential(&self, identity: Option<IdentityClass>) -> Option<String> {
        let identity = identity.or_else(|| self.active_identity())?;
        let state = self.read();

        state.tokens.get(&identity).cloned().or_else(|| match identity {
            IdentityClass::General => state.fallback.clone(),
            IdentityClass::Admin => None,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replace_and_clear() {
        let store = CredentialStore::new();
        assert_eq!(store.get_credential(None), None);

        store.set_credential(IdentityClass::General, Some("sid=1".to_string()));
        store.set_credential(IdentityClass::General, Some("sid=2".to_string()));
        assert_eq!(store.get_credential(None), Some("sid=2".to_string()));

        store.clear(IdentityClass::General);
        assert_eq!(store.get_credential(None), None);
    }

    #[test]
    fn test_explicit_identity_overrides_active() {
        let store = CredentialStore::new();
        store.set_credential(IdentityClass::General, Some("sid=member".to_string()));
        store.set_credential(IdentityClass::Admin, Some("sid=admin".to_string()));

        assert_eq!(store.get_credential(None), Some("sid=member".to_string()));
        assert_eq!(
            store.get_credential(Some(IdentityClass::Admin)),
            Some("sid=admin".to_string())
        );

        store.set_active_identity(Some(IdentityClass::Admin));
        assert_eq!(store.get_credential(None), Some("sid=admin".to_string()));
    }

    #[test]
    fn test_no_active_identity_attaches_nothing() {
        let store = CredentialStore::new();
        store.set_credential(IdentityClass::General, Some("sid=member".to_string()));
        store.set_active_identity(None);

        assert_eq!(store.get_credential(None), None);
        assert_eq!(
            store.get_credential(Some(IdentityClass::General)),
            Some("sid=member".to_string())
        );
    }

    #[test]
    fn test_fallback_only_serves_general() {
        let store = CredentialStore::new().with_fallback_credential(Some("sid=env".to_string()));

        assert_eq!(store.get_credential(None), Some("sid=env".to_string()));
        assert_eq!(store.get_credential(Some(IdentityClass::Admin)), None);
        assert_eq!(store.credential_for(IdentityClass::General), None);

        store.set_credential(IdentityClass::General, Some("sid=fresh".to_string()));
        assert_eq!(store.get_credential(None), Some("sid=fresh".to_string()));
    }

    #[test]
    fn test_clones_share_state_and_clear_all() {
        let store = CredentialStore::new();
        let shared = store.clone();

        shared.set_credential(IdentityClass::Admin, Some("sid=admin".to_string()));
        assert_eq!(store.credential_for(IdentityClass::Admin), Some("sid=admin".to_string()));

        store.clear_all();
        assert_eq!(shared.credential_for(IdentityClass::Admin), None);
        assert_eq!(shared.active_identity(), Some(IdentityClass::General));
    }

    #[test]
    fn test_own_active_identity_shares_tokens_only() {
        let store = CredentialStore::new().with_fallback_credential(Some("sid=env".to_string()));
        let scoped = store.with_own_active_identity();

        scoped.set_active_identity(Some(IdentityClass::Admin));
        store.set_credential(IdentityClass::Admin, Some("sid=admin".to_string()));

        assert_eq!(store.active_identity(), Some(IdentityClass::General));
        assert_eq!(scoped.get_credential(None), Some("sid=admin".to_string()));
        assert_eq!(store.get_credential(None), Some("sid=env".to_string()));

        scoped.clear_all();
        assert_eq!(store.credential_for(IdentityClass::Admin), None);
    }
}
