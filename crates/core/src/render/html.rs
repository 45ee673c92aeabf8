//! Escaping helpers shared by the renderers

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left alone by `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Escape text for use in element content and quoted attributes
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encode a single URL component
pub fn encode_uri_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Bootstrap alert box with already-escaped content
pub fn alert(kind: AlertKind, inner_html: &str) -> String {
    format!(
        r#"<div class="alert {}" role="alert">{inner_html}</div>"#,
        kind.class()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Danger,
    Warning,
    Info,
}

impl AlertKind {
    pub const fn class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Danger => "alert-danger",
            Self::Warning => "alert-warning",
            Self::Info => "alert-info",
        }
    }

    /// Success or danger depending on the exchange outcome
    pub const fn outcome(is_error: bool) -> Self {
        if is_error { Self::Danger } else { Self::Success }
    }
}
