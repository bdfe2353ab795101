//! Bearer-token session and the request-side auth interceptor.
//!
//! # Design
//! Request builders never read ambient storage. The host snapshots its
//! `TokenStore` into a `Session` right before building a request, and the
//! builder passes that session to `authorize`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::http::HttpRequest;

/// Fixed key the token is persisted under.
pub const TOKEN_KEY: &str = "__TOKEN__";

pub const AUTHORIZATION: &str = "authorization";

/// Credential snapshot attached to a single outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Empty tokens are treated as absent.
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
        }
    }

    pub fn from_store<S: TokenStore + ?Sized>(store: &S) -> Self {
        store.get().map(Self::with_token).unwrap_or_default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Attach the session's bearer credential to `request`, if it has one.
pub fn authorize(request: &mut HttpRequest, session: &Session) {
    if let Some(token) = session.token() {
        request.set_header(AUTHORIZATION, format!("Bearer {token}"));
    }
}

/// Persistent home of the single token string.
pub trait TokenStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self) -> Option<String>;

    fn set(&self, token: &str) -> Result<(), Self::Error>;

    fn clear(&self) -> Result<(), Self::Error>;
}

/// Process-local store, used by tests and short-lived hosts.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot is a plain value, so a panic while it was held cannot leave
    /// it half-written.
    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    type Error = std::convert::Infallible;

    fn get(&self) -> Option<String> {
        self.slot().clone()
    }

    fn set(&self, token: &str) -> Result<(), Self::Error> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), Self::Error> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "http://localhost/api/users".to_string())
    }

    #[test]
    fn authorize_attaches_bearer_token() {
        let mut req = request();
        authorize(&mut req, &Session::with_token("abc"));
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn anonymous_session_leaves_request_untouched() {
        let mut req = request();
        authorize(&mut req, &Session::anonymous());
        assert_eq!(req, request());
    }

    #[test]
    fn empty_token_is_anonymous() {
        assert!(!Session::with_token("").is_authenticated());
    }

    #[test]
    fn session_snapshots_store() {
        let store = MemoryTokenStore::new();
        assert!(!Session::from_store(&store).is_authenticated());

        store.set("t1").unwrap();
        let session = Session::from_store(&store);
        assert_eq!(session.token(), Some("t1"));

        store.clear().unwrap();
        assert_eq!(session.token(), Some("t1"));
        assert_eq!(Session::from_store(&store), Session::anonymous());
    }

    #[test]
    fn memory_store_survives_poisoned_lock() {
        let store = MemoryTokenStore::new();
        store.set("before").unwrap();
        std::thread::scope(|scope| {
            let holder = scope.spawn(|| {
                let _guard = store.token.lock().unwrap();
                panic!("panic while holding the token lock");
            });
            assert!(holder.join().is_err());
        });
        assert!(store.token.is_poisoned());

        assert_eq!(store.get().as_deref(), Some("before"));
        store.set("after").unwrap();
        assert_eq!(store.get().as_deref(), Some("after"));
        store.clear().unwrap();
        assert_eq!(store.get(), None);
    }
}
