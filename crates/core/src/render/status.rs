//! Alerts reporting the outcome of form submissions and login attempts

use super::html::{AlertKind, alert, escape_html};
use super::{Effect, RenderContext, Rendered};
use crate::page::attrs;
use crate::payload;
use crate::refresh::RefreshEntry;
use std::fmt::Write;

const SAVE_FAILED: &str = "Request failed. Please review the errors and try again.";
const SAVE_SUCCEEDED: &str = "Saved successfully.";
const LOGIN_FAILED: &str = "Login failed. Double-check your credentials.";
const LOGIN_SUCCEEDED: &str = "Login successful. Redirecting…";

/// An exchange failed if the transport says so or the payload flags an error
fn is_error(ctx: &RenderContext<'_>) -> bool {
    ctx.status >= 400 || payload::has_error_flag(ctx.payload)
}

pub(super) fn form_status(ctx: &RenderContext<'_>) -> Rendered {
    let is_error = is_error(ctx);
    let default_message = if is_error { SAVE_FAILED } else { SAVE_SUCCEEDED };
    let message = payload::message(ctx.payload).unwrap_or(default_message);

    let mut details = String::new();
    for (field, errors) in payload::field_messages(ctx.payload) {
        let _ = write!(
            details,
            "<li><strong>{}:</strong> {}</li>",
            escape_html(&field),
            escape_html(&errors.join(", "))
        );
    }

    let mut effects = Vec::new();
    if !is_error {
        let target = ctx.target;
        if let (Some(selector), Some(endpoint)) = (
            target.data(attrs::REFRESH),
            target.data(attrs::REFRESH_ENDPOINT),
        ) {
            effects.push(Effect::EnqueueRefresh(RefreshEntry::new(selector, endpoint)));
        }
        if target.data(attrs::RESET_FORM) == Some("true") {
            effects.push(Effect::ResetEnclosingForm);
        }
        if let Some(url) = target.data(attrs::REDIRECT) {
            effects.push(Effect::Navigate {
                url: url.to_string(),
                delay: ctx.redirect_delay,
            });
        }
    }

    let details = if details.is_empty() {
        details
    } else {
        format!(r#"<ul class="mt-2 mb-0 small">{details}</ul>"#)
    };

    Rendered {
        html: alert(
            AlertKind::outcome(is_error),
            &format!("<div>{}</div>{details}", escape_html(message)),
        ),
        effects,
    }
}

/// Reports the login outcome only; storing the token happens after the request
pub(super) fn login_feedback(ctx: &RenderContext<'_>) -> Rendered {
    let is_error = is_error(ctx);
    let default_message = if is_error { LOGIN_FAILED } else { LOGIN_SUCCEEDED };
    let message = payload::message(ctx.payload).unwrap_or(default_message);

    Rendered::html(alert(AlertKind::outcome(is_error), &escape_html(message)))
}
