//! Project detail header

use super::html::escape_html;
use super::{RenderContext, Rendered};
use crate::payload::{self, Project};

pub(super) fn header(ctx: &RenderContext<'_>) -> Rendered {
    let project: Project = ctx
        .payload
        .get("data")
        .map(payload::record)
        .unwrap_or_default();

    let name = project.name.as_deref().filter(|s| !s.is_empty()).unwrap_or("Project");
    let description = project
        .description
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("No description provided.");
    let timestamp = |raw: Option<&str>| match raw.filter(|s| !s.is_empty()) {
        Some(raw) => escape_html(&ctx.localizer.date_time(raw)),
        None => "—".to_string(),
    };

    Rendered::html(format!(
        r#"<div class="d-flex justify-content-between align-items-start flex-wrap gap-3 mb-3"><div><h1 class="h4 mb-2">{}</h1><p class="mb-0 text-muted">{}</p></div><div class="text-end small text-muted"><div>Created: {}</div><div>Updated: {}</div></div></div>"#,
        escape_html(name),
        escape_html(description),
        timestamp(project.created_at.as_deref()),
        timestamp(project.updated_at.as_deref()),
    ))
}
