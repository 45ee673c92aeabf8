//! Session token and API base, kept in a [`KeyValueStore`]

use crate::config::{FrontendRoutes, PanelSettings};
use crate::page::Page;
use crate::store::KeyValueStore;
use crate::StoreError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "pm_token";

/// Storage key of the configured API base
pub const API_BASE_KEY: &str = "pm_api_base";

static ABSOLUTE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Per-session state shared by every step of an exchange
#[derive(Debug)]
pub struct SessionContext<S: KeyValueStore> {
    store: S,
    default_api_base: String,
    routes: FrontendRoutes,
}

impl<S: KeyValueStore> SessionContext<S> {
    pub fn new(store: S, settings: &PanelSettings) -> Self {
        Self {
            store,
            default_api_base: settings.api_base.clone(),
            routes: settings.routes(),
        }
    }

    #[must_use]
    pub fn with_routes(mut self, routes: FrontendRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    /// Store a freshly issued token; empty tokens are ignored
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write
    pub fn set_token(&mut self, token: &str) -> Result<(), StoreError> {
        if token.is_empty() {
            return Ok(());
        }
        self.store.set(TOKEN_KEY, token)
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the removal
    pub fn clear_token(&mut self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Stored API base, or the configured default
    pub fn api_base(&self) -> String {
        self.store
            .get(API_BASE_KEY)
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| self.default_api_base.clone())
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write
    pub fn set_api_base(&mut self, base: &str) -> Result<(), StoreError> {
        self.store.set(API_BASE_KEY, base)
    }

    /// Resolve `path` against the API base
    ///
    /// Empty paths stay empty and scheme-qualified URLs pass through.
    pub fn build_api_url(&self, path: &str) -> String {
        if path.is_empty() || ABSOLUTE_URL.is_match(path) {
            return path.to_string();
        }
        format!("{}{path}", self.api_base().trim_end_matches('/'))
    }

    pub fn routes(&self) -> &FrontendRoutes {
        &self.routes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Drop the token and send the page to the login form
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be removed from the store
    pub fn logout(&mut self, page: &mut dyn Page) -> Result<(), StoreError> {
        self.clear_token()?;
        tracing::info!("Logged out");
        page.navigate(&self.routes.login_page(), Duration::ZERO);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{MemoryPage, Navigation};
    use crate::store::MemoryStore;
    use crate::store::mock::MockKeyValueStore;
    use mockall::predicate::eq;

    fn session(entries: &[(&str, &str)]) -> SessionContext<MemoryStore> {
        SessionContext::new(
            MemoryStore::with_entries(entries.iter().copied()),
            &PanelSettings::default(),
        )
    }

    #[test]
    fn test_token_lifecycle() {
        let mut session = session(&[]);
        assert!(!session.is_authenticated());

        session.set_token("").unwrap();
        assert_eq!(session.token(), None);

        session.set_token("abc").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.clear_token().unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_build_api_url() {
        let session = session(&[]);
        assert_eq!(session.build_api_url("/users"), "http://localhost:5000/users");
        assert_eq!(session.build_api_url(""), "");
        assert_eq!(
            session.build_api_url("http://other:9000/x"),
            "http://other:9000/x"
        );
        assert_eq!(session.build_api_url("Https://secure/x"), "Https://secure/x");
    }

    #[test]
    fn test_stored_api_base_wins() {
        let session = session(&[(API_BASE_KEY, "https://api.example.com/v1//")]);
        assert_eq!(session.api_base(), "https://api.example.com/v1//");
        assert_eq!(
            session.build_api_url("/projects/3/tasks"),
            "https://api.example.com/v1/projects/3/tasks"
        );

        let empty = self::session(&[(API_BASE_KEY, "")]);
        assert_eq!(empty.api_base(), "http://localhost:5000");
    }

    #[test]
    fn test_logout_navigates_to_login() {
        let mut session = session(&[(TOKEN_KEY, "abc")]);
        let mut page = MemoryPage::new("/users/list.html");

        session.logout(&mut page).unwrap();

        assert_eq!(session.token(), None);
        assert_eq!(
            page.navigations(),
            &[Navigation {
                url: "http://localhost:8000/index.html".to_string(),
                delay: Duration::ZERO,
            }]
        );
    }

    #[test]
    fn test_store_failure_propagates() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .with(eq(TOKEN_KEY), eq("abc"))
            .times(1)
            .returning(|_, _| Err(StoreError::Unavailable("quota exceeded".into())));

        let mut session = SessionContext::new(store, &PanelSettings::default());
        let result = session.set_token("abc");
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_failed_logout_keeps_page() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_remove()
            .returning(|_| Err(StoreError::Unavailable("locked".into())));

        let mut session = SessionContext::new(store, &PanelSettings::default());
        let mut page = MemoryPage::new("/users/list.html");

        assert!(session.logout(&mut page).is_err());
        assert!(page.navigations().is_empty());
    }
}
