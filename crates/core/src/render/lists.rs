//! Table renderers for the users, projects and tasks collections

use super::html::{encode_uri_component, escape_html};
use super::pagination::build_pagination;
use super::{RenderContext, Rendered};
use crate::page::attrs;
use crate::payload::{self, PageMeta, Project, RecordId, Task, User};
use std::fmt::Write;

const EM_DASH: &str = "—";

/// Column layout of a table fragment
struct Table<'a> {
    headers: &'a [&'a str],
    empty_message: &'a str,
}

impl Table<'_> {
    fn render(&self, rows: &[String]) -> String {
        let mut head = String::new();
        for (i, header) in self.headers.iter().enumerate() {
            if i + 1 == self.headers.len() {
                let _ = write!(head, r#"<th scope="col" class="text-end">{header}</th>"#);
            } else {
                let _ = write!(head, r#"<th scope="col">{header}</th>"#);
            }
        }

        let body = if rows.is_empty() {
            format!(
                r#"<tr><td colspan="{}" class="text-center text-muted py-4">{}</td></tr>"#,
                self.headers.len(),
                self.empty_message
            )
        } else {
            rows.concat()
        };

        format!(
            r#"<div class="table-responsive"><table class="table table-striped align-middle"><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table></div>"#
        )
    }
}

/// Heading, alert region and table shared by the users and projects pages
struct Collection<'a> {
    title: &'a str,
    create_label: &'a str,
    /// Resource path, also the id prefix of the list and alert elements
    resource: &'a str,
}

impl Collection<'_> {
    fn render(&self, meta: &PageMeta, table: &str) -> String {
        let resource = self.resource;
        let pagination = build_pagination(meta, &format!("/{resource}"), &format!("{resource}-list"));
        format!(
            r##"<div class="d-flex justify-content-between align-items-center mb-3"><h1 class="h4 mb-0">{title}</h1><a class="btn btn-primary btn-sm" href="create.html">{create}</a></div><div id="{resource}-alert" class="mb-3" data-render="form-status" data-refresh="#{resource}-list" data-refresh-endpoint="/{resource}?page={page}&per_page={per_page}"></div>{table}{pagination}"##,
            title = self.title,
            create = self.create_label,
            page = meta.page,
            per_page = meta.per_page,
        )
    }
}

fn text(value: Option<&str>) -> String {
    escape_html(value.unwrap_or_default())
}

fn encoded_id(id: Option<&RecordId>) -> String {
    id.map(|id| encode_uri_component(&id.to_string()))
        .unwrap_or_else(|| "undefined".to_string())
}

/// Edit link plus a confirmed DELETE button targeting the collection's alert region
fn row_actions(resource: &str, noun: &str, edit_url: &str, id: &str) -> String {
    format!(
        r##"<td class="text-end"><a class="btn btn-outline-secondary btn-sm me-2" href="{edit_url}" title="Edit {noun}" aria-label="Edit {noun}"><i class="bi bi-pencil"></i></a><button class="btn btn-outline-danger btn-sm" type="button" hx-delete="/{resource}/{id}" hx-target="#{resource}-alert" hx-swap="innerHTML" hx-confirm="Delete this {noun}?"><i class="bi bi-x-lg"></i><span class="visually-hidden">Delete {noun}</span></button></td>"##
    )
}

pub(super) fn users(ctx: &RenderContext<'_>) -> Rendered {
    let users: Vec<User> = payload::records(ctx.payload);
    let meta = payload::meta_or_single_page(ctx.payload, users.len());

    let rows: Vec<String> = users
        .iter()
        .map(|user| {
            let id = encoded_id(user.id.as_ref());
            format!(
                r#"<tr><td>{}</td><td>{}</td><td><span class="badge bg-secondary text-uppercase">{}</span></td>{}</tr>"#,
                text(user.name.as_deref()),
                text(user.email.as_deref()),
                text(user.role.as_deref()),
                row_actions("users", "user", &format!("edit.html?id={id}"), &id),
            )
        })
        .collect();

    let table = Table {
        headers: &["Name", "Email", "Role", "Actions"],
        empty_message: "No users found.",
    }
    .render(&rows);

    Rendered::html(
        Collection {
            title: "Users",
            create_label: "Create User",
            resource: "users",
        }
        .render(&meta, &table),
    )
}

pub(super) fn projects(ctx: &RenderContext<'_>) -> Rendered {
    let projects: Vec<Project> = payload::records(ctx.payload);
    let meta = payload::meta_or_single_page(ctx.payload, projects.len());

    let rows: Vec<String> = projects
        .iter()
        .map(|project| {
            let id = encoded_id(project.id.as_ref());
            let created = project
                .created_at
                .as_deref()
                .filter(|raw| !raw.is_empty())
                .map(|raw| escape_html(&ctx.localizer.date_time(raw)))
                .unwrap_or_default();
            format!(
                r#"<tr><td><a href="detail.html?id={id}" class="link-primary fw-semibold">{}</a></td><td>{}</td><td>{created}</td>{}</tr>"#,
                text(project.name.as_deref()),
                text(project.description.as_deref()),
                row_actions("projects", "project", &format!("edit.html?id={id}"), &id),
            )
        })
        .collect();

    let table = Table {
        headers: &["Name", "Description", "Created", "Actions"],
        empty_message: "No projects yet.",
    }
    .render(&rows);

    Rendered::html(
        Collection {
            title: "Projects",
            create_label: "Create Project",
            resource: "projects",
        }
        .render(&meta, &table),
    )
}

pub(super) fn tasks(ctx: &RenderContext<'_>) -> Rendered {
    let project_id = ctx.target.data(attrs::PROJECT_ID);
    let tasks: Vec<Task> = payload::records(ctx.payload);
    let meta = payload::meta_or_single_page(ctx.payload, tasks.len());
    let encoded_project = encode_uri_component(project_id.unwrap_or_default());

    let rows: Vec<String> = tasks
        .iter()
        .map(|task| {
            let id = encoded_id(task.id.as_ref());
            let due = task
                .due_date
                .as_deref()
                .filter(|raw| !raw.is_empty())
                .map_or_else(|| EM_DASH.to_string(), |raw| escape_html(&ctx.localizer.date(raw)));
            let assignee = task
                .assigned_to
                .as_ref()
                .map_or_else(|| EM_DASH.to_string(), |id| escape_html(&id.to_string()));
            format!(
                r#"<tr><td>{}</td><td>{}</td><td>{due}</td><td>{assignee}</td><td class="text-end"><a class="btn btn-outline-secondary btn-sm" href="../tasks/edit.html?id={id}&projectId={encoded_project}">Edit</a></td></tr>"#,
                text(task.title.as_deref()),
                text(task.status.as_deref()),
            )
        })
        .collect();

    let table = Table {
        headers: &["Title", "Status", "Due Date", "Assignee", "Actions"],
        empty_message: "No tasks found.",
    }
    .render(&rows);

    let endpoint = format!("/projects/{}/tasks", project_id.unwrap_or_default());
    let target_id = ctx.target.id.as_deref().unwrap_or_default();
    let pagination = build_pagination(&meta, &endpoint, target_id);

    Rendered::html(format!("{table}{pagination}"))
}
