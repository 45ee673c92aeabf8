//! Response renderer registry
//!
//! A swap target names its renderer through `data-render`. Only JSON
//! responses are intercepted; everything else keeps the exchange library's
//! default swap.

pub mod html;
mod lists;
pub mod pagination;
mod prefill;
mod project;
mod status;
pub mod time;

pub use prefill::{PREFILL_FIELDS, find_task};
pub use time::Localizer;

use crate::page::{Page, SwapTarget};
use crate::payload;
use crate::refresh::RefreshEntry;
use html::{AlertKind, alert, escape_html};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The fixed set of fragment renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Renderer {
    UsersList,
    ProjectsList,
    ProjectHeader,
    TasksList,
    FormStatus,
    LoginFeedback,
    TaskPrefill,
}

impl Renderer {
    pub const ALL: [Self; 7] = [
        Self::UsersList,
        Self::ProjectsList,
        Self::ProjectHeader,
        Self::TasksList,
        Self::FormStatus,
        Self::LoginFeedback,
        Self::TaskPrefill,
    ];

    /// Name used in `data-render`
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UsersList => "users-list",
            Self::ProjectsList => "projects-list",
            Self::ProjectHeader => "project-header",
            Self::TasksList => "tasks-list",
            Self::FormStatus => "form-status",
            Self::LoginFeedback => "login-feedback",
            Self::TaskPrefill => "task-prefill",
        }
    }

    pub fn render(self, ctx: &RenderContext<'_>) -> Rendered {
        match self {
            Self::UsersList => lists::users(ctx),
            Self::ProjectsList => lists::projects(ctx),
            Self::ProjectHeader => project::header(ctx),
            Self::TasksList => lists::tasks(ctx),
            Self::FormStatus => status::form_status(ctx),
            Self::LoginFeedback => status::login_feedback(ctx),
            Self::TaskPrefill => prefill::task_prefill(ctx),
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised `data-render` value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown renderer: {0}")]
pub struct UnknownRenderer(pub String);

impl FromStr for Renderer {
    type Err = UnknownRenderer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|renderer| renderer.as_str() == s)
            .ok_or_else(|| UnknownRenderer(s.to_string()))
    }
}

/// Everything a renderer may look at
pub struct RenderContext<'a> {
    pub payload: &'a Value,
    pub target: &'a SwapTarget,
    /// Transport status of the exchange
    pub status: u16,
    pub page: &'a dyn Page,
    pub localizer: Localizer,
    pub redirect_delay: Duration,
}

/// Page mutation requested by a renderer, applied by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    EnqueueRefresh(RefreshEntry),
    ResetEnclosingForm,
    Navigate { url: String, delay: Duration },
    SetField { form: String, name: String, value: String },
    HideTarget,
}

/// Output of a renderer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub effects: Vec<Effect>,
}

impl Rendered {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            effects: Vec::new(),
        }
    }
}

/// Raw response as delivered by the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, content_type: Option<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    /// JSON response with `value` as body
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, Some("application/json".to_string()), value.to_string())
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.contains("application/json"))
    }

    pub const fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Parse the body as JSON, an empty body reading as `{}`
    pub fn json_body(&self) -> Result<Value, serde_json::Error> {
        if self.body.trim().is_empty() {
            Ok(Value::Object(serde_json::Map::new()))
        } else {
            serde_json::from_str(&self.body)
        }
    }
}

/// What to put into the swap target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapDecision {
    /// Not intercepted: the raw body is swapped, unless the status is an error
    Default,
    /// A renderer produced the content; swapped whatever the status
    Render(Rendered),
    /// Generic info alert for an unrendered payload carrying a message;
    /// error statuses still suppress the swap
    Fallback(String),
}

impl SwapDecision {
    /// Content to swap into the target for `response`, if any
    pub fn content<'a>(&'a self, response: &'a TransportResponse) -> Option<&'a str> {
        match self {
            Self::Render(rendered) => Some(rendered.html.as_str()),
            Self::Fallback(html) if !response.is_error() => Some(html.as_str()),
            Self::Default if !response.is_error() => Some(response.body.as_str()),
            Self::Fallback(_) | Self::Default => None,
        }
    }
}

/// Turn a response into a swap decision for `target`
pub fn render_response(
    response: &TransportResponse,
    target: &SwapTarget,
    page: &dyn Page,
    localizer: Localizer,
    redirect_delay: Duration,
) -> SwapDecision {
    if !response.is_json() {
        return SwapDecision::Default;
    }

    let payload = match response.json_body() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("Ignoring unparseable JSON body: {e}");
            return SwapDecision::Default;
        }
    };

    if let Some(renderer) = target.renderer() {
        tracing::debug!(%renderer, status = response.status, "Rendering fragment");
        let ctx = RenderContext {
            payload: &payload,
            target,
            status: response.status,
            page,
            localizer,
            redirect_delay,
        };
        return SwapDecision::Render(renderer.render(&ctx));
    }

    match payload::message(&payload) {
        Some(message) => SwapDecision::Fallback(alert(AlertKind::Info, &escape_html(message))),
        None => SwapDecision::Default,
    }
}
