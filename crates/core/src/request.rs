//! Outgoing request interception
//!
//! Login calls carry the credentials in a Basic `Authorization` header and
//! nothing else; every other call carries the session token as a Bearer
//! credential. Paths are resolved against the API base in both cases.

use crate::store::KeyValueStore;
use crate::{PanelError, PanelResult, SessionContext};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde_json::{Map, Value};

const JSON: &str = "application/json";

/// An outgoing request as issued by the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Target path, relative to the API base or absolute
    pub path: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub parameters: Map<String, Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: HeaderMap::new(),
            parameters: Map::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Parse the verb as written in markup (`hx-post`, `"delete"`, ...)
    ///
    /// # Errors
    ///
    /// Returns an error if `verb` is not a valid HTTP method token
    pub fn from_verb(verb: &str, path: impl Into<String>) -> PanelResult<Self> {
        let method = Method::from_bytes(verb.to_ascii_uppercase().as_bytes())
            .map_err(|_| PanelError::InvalidMethod(verb.to_string()))?;
        Ok(Self::new(method, path))
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Whether this is a credential exchange against the login endpoint
    pub fn is_login(&self) -> bool {
        self.method == Method::POST && self.path.ends_with("/login")
    }
}

/// A request ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Absolute URL
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub parameters: Map<String, Value>,
    pub is_login: bool,
}

impl PreparedRequest {
    /// Whether parameters travel as a JSON body rather than the query string
    pub fn sends_json_body(&self) -> bool {
        self.method != Method::GET
            && self.method != Method::DELETE
            && !self.parameters.is_empty()
            && self
                .headers
                .get(CONTENT_TYPE)
                .is_some_and(|value| value.as_bytes().starts_with(JSON.as_bytes()))
    }
}

/// Attach credentials and content negotiation headers, resolve the path
///
/// # Errors
///
/// Returns an error if a credential cannot be encoded as a header value
pub fn prepare_request<S: KeyValueStore>(
    session: &SessionContext<S>,
    descriptor: RequestDescriptor,
) -> PanelResult<PreparedRequest> {
    let is_login = descriptor.is_login();
    let RequestDescriptor {
        path,
        method,
        mut headers,
        mut parameters,
    } = descriptor;

    if is_login {
        let username = non_empty_param(&parameters, "email")
            .or_else(|| non_empty_param(&parameters, "username"))
            .unwrap_or_default();
        let password = non_empty_param(&parameters, "password").unwrap_or_default();
        let encoded = STANDARD.encode(format!("{username}:{password}"));

        headers.insert(AUTHORIZATION, header_value(AUTHORIZATION, &format!("Basic {encoded}"))?);
        headers.remove(CONTENT_TYPE);
        parameters.clear();
    } else {
        if let Some(token) = session.token() {
            headers.insert(AUTHORIZATION, header_value(AUTHORIZATION, &format!("Bearer {token}"))?);
        }
        if method != Method::GET {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        }
    }
    headers.insert(ACCEPT, HeaderValue::from_static(JSON));

    let url = session.build_api_url(&path);
    tracing::debug!(%method, %url, is_login, "Prepared request");

    Ok(PreparedRequest {
        url,
        method,
        headers,
        parameters,
        is_login,
    })
}

fn non_empty_param(parameters: &Map<String, Value>, name: &str) -> Option<String> {
    match parameters.get(name)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}

fn header_value(name: HeaderName, value: &str) -> PanelResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|source| PanelError::InvalidHeader {
        name: if name == AUTHORIZATION { "Authorization" } else { "Content-Type" },
        source,
    })
}
