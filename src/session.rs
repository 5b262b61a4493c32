//! Session termination: the end of the line when credentials cannot be
//! refreshed.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::RouteConfig;
use crate::signals::Navigator;
use crate::store::{CredentialSlot, CredentialStore};

/// Clears both stored credentials and routes the user back to login.
/// Idempotent: clearing absent credentials is a no-op, and the redirect is
/// suppressed while the current view is already part of the auth flow, so
/// repeated terminations cannot loop.
pub struct SessionGuard {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    routes: RouteConfig,
}

impl SessionGuard {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        routes: RouteConfig,
    ) -> Self {
        SessionGuard {
            store,
            navigator,
            routes,
        }
    }

    /// True when the current view already belongs to the authentication flow.
    pub fn on_auth_view(&self) -> bool {
        self.navigator
            .current_path()
            .starts_with(&self.routes.auth_prefix)
    }

    pub async fn terminate(&self) {
        self.store.remove(CredentialSlot::Access).await;
        self.store.remove(CredentialSlot::Refresh).await;

        if self.on_auth_view() {
            debug!("already inside the authentication flow, suppressing login redirect");
            return;
        }

        info!("session terminated, redirecting to '{}'", self.routes.login);
        self.navigator.go(&self.routes.login);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory_store::MemoryStore;
    use std::sync::Mutex;

    struct FakeNavigator {
        current: String,
        visited: Mutex<Vec<String>>,
    }

    impl FakeNavigator {
        fn at(path: &str) -> Arc<Self> {
            Arc::new(FakeNavigator {
                current: path.to_string(),
                visited: Mutex::new(Vec::new()),
            })
        }

        fn visited(&self) -> Vec<String> {
            self.visited.lock().unwrap().clone()
        }
    }

    impl Navigator for FakeNavigator {
        fn go(&self, path: &str) {
            self.visited.lock().unwrap().push(path.to_string());
        }

        fn current_path(&self) -> String {
            self.current.clone()
        }
    }

    #[tokio::test]
    async fn test_terminate_clears_credentials_and_redirects() {
        let store = Arc::new(MemoryStore::new());
        store.set(CredentialSlot::Access, "t1").await;
        store.set(CredentialSlot::Refresh, "r1").await;
        let navigator = FakeNavigator::at("/zones/12");

        let guard = SessionGuard::new(store.clone(), navigator.clone(), RouteConfig::default());
        guard.terminate().await;

        assert_eq!(store.get(CredentialSlot::Access).await, None);
        assert_eq!(store.get(CredentialSlot::Refresh).await, None);
        assert_eq!(navigator.visited(), vec!["/auth/login".to_string()]);
    }

    #[tokio::test]
    async fn test_redirect_suppressed_on_auth_view() {
        let store = Arc::new(MemoryStore::new());
        let navigator = FakeNavigator::at("/auth/login");

        let guard = SessionGuard::new(store, navigator.clone(), RouteConfig::default());
        guard.terminate().await;

        assert!(navigator.visited().is_empty());
    }

    #[tokio::test]
    async fn test_terminate_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let navigator = FakeNavigator::at("/dashboard");

        let guard = SessionGuard::new(store.clone(), navigator.clone(), RouteConfig::default());
        guard.terminate().await;
        guard.terminate().await;

        assert_eq!(store.get(CredentialSlot::Access).await, None);
        assert_eq!(navigator.visited().len(), 2);
    }
}
