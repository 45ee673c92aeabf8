//! Reactions to a finished exchange: token capture and forced logout

use crate::page::Page;
use crate::payload::{display_value, is_truthy};
use crate::render::TransportResponse;
use crate::session::SessionContext;
use crate::store::KeyValueStore;
use crate::PanelResult;
use serde_json::Value;
use std::time::Duration;

/// Side effects performed by [`on_request_complete`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// A login response issued a token that is now stored
    pub token_stored: bool,
    /// A 401 cleared the session
    pub forced_logout: bool,
}

/// Run the post-request hooks for the exchange against `path`
///
/// `path` is the resolved request URL. A successful login stores the issued
/// token and moves to the landing page; any 401 drops the token and returns
/// to the login page unless already there.
///
/// # Errors
///
/// Returns an error if the session store rejects the update
pub fn on_request_complete<S: KeyValueStore>(
    session: &mut SessionContext<S>,
    path: &str,
    response: &TransportResponse,
    page: &mut dyn Page,
) -> PanelResult<CompletionOutcome> {
    let mut outcome = CompletionOutcome::default();

    if path.ends_with("/login") && response.status == 200 {
        match response.json_body() {
            Ok(payload) => {
                if let Some(token) = issued_token(&payload) {
                    session.set_token(&token)?;
                    outcome.token_stored = true;
                    tracing::info!("Login succeeded, token stored");
                    page.navigate(&session.routes().landing_page(), Duration::ZERO);
                }
            }
            Err(e) => tracing::warn!("Ignoring unparseable login response: {e}"),
        }
    }

    if response.status == 401 {
        session.clear_token()?;
        outcome.forced_logout = true;
        if page.location_path().ends_with("/index.html") {
            tracing::debug!("Unauthorized on the login page, staying");
        } else {
            tracing::info!("Unauthorized, returning to login");
            page.navigate(&session.routes().login_page(), Duration::ZERO);
        }
    }

    Ok(outcome)
}

/// First truthy of `access_token`, `token`, `data.token`
fn issued_token(payload: &Value) -> Option<String> {
    [
        payload.get("access_token"),
        payload.get("token"),
        payload.get("data").and_then(|data| data.get("token")),
    ]
    .into_iter()
    .flatten()
    .find(|value| is_truthy(value))
    .map(display_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{MemoryPage, Navigation};
    use crate::session::TOKEN_KEY;
    use crate::{MemoryStore, PanelSettings};
    use serde_json::json;

    const LOGIN_URL: &str = "http://localhost:5000/login";

    fn session(token: Option<&str>) -> SessionContext<MemoryStore> {
        let store = match token {
            Some(token) => MemoryStore::with_entries([(TOKEN_KEY, token)]),
            None => MemoryStore::new(),
        };
        SessionContext::new(store, &PanelSettings::default())
    }

    fn navigated_to(page: &MemoryPage) -> Vec<&str> {
        page.navigations().iter().map(|nav| nav.url.as_str()).collect()
    }

    #[test]
    fn test_login_stores_access_token() {
        let mut session = session(None);
        let mut page = MemoryPage::new("/index.html");
        let response = TransportResponse::json(
            200,
            &json!({"access_token": "abc", "token_type": "Bearer"}),
        );

        let outcome = on_request_complete(&mut session, LOGIN_URL, &response, &mut page).unwrap();

        assert!(outcome.token_stored);
        assert_eq!(session.token().as_deref(), Some("abc"));
        assert_eq!(
            page.navigations(),
            &[Navigation {
                url: "http://localhost:8000/users/list.html".into(),
                delay: Duration::ZERO,
            }]
        );
    }

    #[test]
    fn test_token_fallback_order() {
        assert_eq!(
            issued_token(&json!({"access_token": "", "token": "t2", "data": {"token": "t3"}})),
            Some("t2".into())
        );
        assert_eq!(issued_token(&json!({"data": {"token": "t3"}})), Some("t3".into()));
        assert_eq!(issued_token(&json!({"message": "ok"})), None);
        assert_eq!(issued_token(&json!([1, 2])), None);
    }

    #[test]
    fn test_login_needs_exact_200() {
        let mut session = session(None);
        let mut page = MemoryPage::new("/index.html");
        let response = TransportResponse::json(201, &json!({"access_token": "abc"}));

        let outcome = on_request_complete(&mut session, LOGIN_URL, &response, &mut page).unwrap();

        assert_eq!(outcome, CompletionOutcome::default());
        assert_eq!(session.token(), None);
        assert!(page.navigations().is_empty());
    }

    #[test]
    fn test_login_parse_failure_is_swallowed() {
        let mut session = session(None);
        let mut page = MemoryPage::new("/index.html");
        let response = TransportResponse::new(200, Some("text/html".into()), "<html>");

        let outcome = on_request_complete(&mut session, LOGIN_URL, &response, &mut page).unwrap();
        assert!(!outcome.token_stored);
    }

    #[test]
    fn test_unauthorized_forces_logout() {
        let mut session = session(Some("T"));
        let mut page = MemoryPage::new("/projects/list.html");
        let response = TransportResponse::json(401, &json!({"error": "unauthorized"}));

        let outcome =
            on_request_complete(&mut session, "http://localhost:5000/projects", &response, &mut page)
                .unwrap();

        assert!(outcome.forced_logout);
        assert_eq!(session.token(), None);
        assert_eq!(navigated_to(&page), ["http://localhost:8000/index.html"]);
    }

    #[test]
    fn test_unauthorized_on_login_page_stays() {
        let mut session = session(Some("T"));
        let mut page = MemoryPage::new("/panel/index.html");
        let response = TransportResponse::json(401, &json!({}));

        let outcome = on_request_complete(&mut session, LOGIN_URL, &response, &mut page).unwrap();

        assert!(outcome.forced_logout);
        assert_eq!(session.token(), None);
        assert!(page.navigations().is_empty());
    }
}
