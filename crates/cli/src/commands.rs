//! CLI commands
//!
//! Each exchange command lays out the elements its HTML page would contain,
//! runs the exchange and prints what ended up on the page.

use anyhow::{Context, Result, bail};
use clap::{Subcommand, ValueEnum};
use pm_panel_core::page::{LOGOUT_CONTROL_ID, attrs};
use pm_panel_core::render::PREFILL_FIELDS;
use pm_panel_core::{
    FileStore, MemoryPage, Page, Panel, PanelSettings, RequestDescriptor,
    SessionContext, SwapTarget,
};
use pm_panel_http::{ExchangeReport, ExchangeRequest, HttpTransport, PanelClient};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the issued token
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "PM_PANEL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored token
    Logout,

    /// List users
    Users {
        #[command(flatten)]
        paging: Paging,
    },

    /// List projects
    Projects {
        #[command(flatten)]
        paging: Paging,
    },

    /// Show a project's header
    Project {
        /// Project id
        id: String,
    },

    /// List a project's tasks
    Tasks {
        /// Project id
        project_id: String,

        #[command(flatten)]
        paging: Paging,
    },

    /// Delete a user or project, then reload its list
    Delete {
        resource: Resource,

        /// Record id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,

        #[command(flatten)]
        paging: Paging,
    },

    /// Submit a form
    Submit {
        /// HTTP verb (post, put, patch, ...)
        verb: String,

        /// API path, e.g. /projects
        path: String,

        /// Form field as name=value (repeatable); JSON values are sent as such
        #[arg(short = 'f', long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Page to open after a successful save
        #[arg(long)]
        redirect: Option<String>,

        /// Clear the form after a successful save
        #[arg(long)]
        reset: bool,
    },

    /// Load a task into the edit form
    Prefill {
        /// Project id
        project_id: String,

        /// Task id
        task_id: String,
    },

    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show,

    /// Store the API base used to resolve request paths
    SetApiBase {
        /// Base URL, e.g. https://api.example.com
        url: String,
    },
}

#[derive(clap::Args, Clone, Copy, Debug)]
pub struct Paging {
    /// Page number
    #[arg(long, default_value_t = 1)]
    page: u64,

    /// Records per page
    #[arg(long, default_value_t = 10)]
    per_page: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Resource {
    Users,
    Projects,
}

impl Resource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Projects => "projects",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Users => "user",
            Self::Projects => "project",
        }
    }
}

/// A page laid out for one exchange
struct Screen {
    page: MemoryPage,
    request: ExchangeRequest,
    /// Elements printed after the exchange
    shown: Vec<String>,
    /// Form printed after the exchange
    form: Option<String>,
}

impl Screen {
    fn new(location: &str, descriptor: RequestDescriptor, target: SwapTarget) -> Result<Self> {
        let selector = target.selector().context("swap target needs an id")?;
        let mut page = MemoryPage::new(location);
        page.insert_target(SwapTarget::with_id(LOGOUT_CONTROL_ID));
        page.insert_target(target);

        Ok(Self {
            page,
            request: ExchangeRequest::new(descriptor, selector.clone()),
            shown: vec![selector],
            form: None,
        })
    }

    fn print(&self, report: &ExchangeReport) {
        for selector in &self.shown {
            if let Some(html) = self.page.content(selector) {
                if !html.is_empty() {
                    println!("{html}");
                }
            }
        }

        if let Some(fields) = self.form.as_deref().and_then(|form| self.page.fields(form)) {
            for (name, value) in fields {
                println!("{name} = {value}");
            }
        }

        if !report.swapped {
            println!("(status {}, nothing swapped)", report.status);
        }

        for navigation in self.page.navigations() {
            println!(
                "navigate: {} (after {} ms)",
                navigation.url,
                navigation.delay.as_millis()
            );
        }
    }
}

impl Commands {
    /// Execute the command
    pub async fn execute(self, settings: PanelSettings, state_file: PathBuf) -> Result<()> {
        let store = FileStore::open(&state_file)
            .with_context(|| format!("Failed to open session state {}", state_file.display()))?;

        match self {
            Commands::Config { command } => command.execute(&settings, store),
            Commands::Logout => {
                let mut panel = Panel::new(store, &settings);
                let mut page = MemoryPage::new("/users/list.html");
                panel.logout(&mut page)?;
                for navigation in page.navigations() {
                    println!("navigate: {}", navigation.url);
                }
                Ok(())
            }
            command => {
                if let Some(prompt) = command.confirmation() {
                    let confirmed = dialoguer::Confirm::new()
                        .with_prompt(prompt)
                        .default(false)
                        .interact()
                        .unwrap_or(false);
                    if !confirmed {
                        println!("Cancelled.");
                        return Ok(());
                    }
                }

                let mut screen = command.screen()?;
                let transport = HttpTransport::from_settings(&settings)?;
                let mut client = PanelClient::new(Panel::new(store, &settings), transport);

                let report = client.exchange(&mut screen.page, screen.request.clone()).await?;
                info!(
                    status = report.status,
                    swapped = report.swapped,
                    refreshed = report.refreshed.len(),
                    dropped = report.dropped_refreshes,
                    "Exchange finished"
                );

                if report.completion.forced_logout {
                    println!("Not authorized, the stored token was cleared.");
                }
                screen.print(&report);
                Ok(())
            }
        }
    }

    /// Question to ask before a destructive exchange
    fn confirmation(&self) -> Option<String> {
        match self {
            Commands::Delete {
                resource,
                yes: false,
                ..
            } => Some(format!("Delete this {}?", resource.noun())),
            _ => None,
        }
    }

    fn screen(self) -> Result<Screen> {
        match self {
            Commands::Login { email, password } => {
                let descriptor = RequestDescriptor::new(http::Method::POST, "/login")
                    .param("email", email)
                    .param("password", password);
                Screen::new(
                    "/index.html",
                    descriptor,
                    SwapTarget::with_id("login-alert").data_attr(attrs::RENDER, "login-feedback"),
                )
            }
            Commands::Users { paging } => list_screen(Resource::Users, paging),
            Commands::Projects { paging } => list_screen(Resource::Projects, paging),
            Commands::Project { id } => Screen::new(
                "/projects/detail.html",
                RequestDescriptor::get(format!("/projects/{id}")),
                SwapTarget::with_id("project-header").data_attr(attrs::RENDER, "project-header"),
            ),
            Commands::Tasks { project_id, paging } => Screen::new(
                "/projects/detail.html",
                paged(format!("/projects/{project_id}/tasks"), paging),
                SwapTarget::with_id("project-tasks")
                    .data_attr(attrs::RENDER, "tasks-list")
                    .data_attr(attrs::PROJECT_ID, project_id),
            ),
            Commands::Delete {
                resource,
                id,
                paging,
                ..
            } => delete_screen(resource, &id, paging),
            Commands::Submit {
                verb,
                path,
                fields,
                redirect,
                reset,
            } => submit_screen(&verb, path, fields, redirect, reset),
            Commands::Prefill {
                project_id,
                task_id,
            } => {
                let mut screen = Screen::new(
                    "/tasks/edit.html",
                    RequestDescriptor::get(format!("/projects/{project_id}/tasks")),
                    SwapTarget::with_id("task-loader")
                        .data_attr(attrs::RENDER, "task-prefill")
                        .data_attr(attrs::TASK_ID, task_id)
                        .data_attr(attrs::PREFILL_FORM, "#task-form"),
                )?;
                screen.page.insert_form("#task-form", &PREFILL_FIELDS);
                screen.form = Some("#task-form".to_string());
                Ok(screen)
            }
            Commands::Logout | Commands::Config { .. } => bail!("not an exchange command"),
        }
    }
}

impl ConfigCommands {
    fn execute(self, settings: &PanelSettings, store: FileStore) -> Result<()> {
        let mut session = SessionContext::new(store, settings);
        match self {
            ConfigCommands::Show => {
                println!("{}", config::describe(settings, &session.api_base())?);
                println!("state_file = {}", session.store().path().display());
                println!("authenticated = {}", session.is_authenticated());
            }
            ConfigCommands::SetApiBase { url } => {
                url::Url::parse(&url).with_context(|| format!("Invalid API base: {url}"))?;
                session.set_api_base(&url)?;
                info!(api_base = %url, "API base updated");
                println!("API base set to {url}");
            }
        }
        Ok(())
    }
}

fn paged(path: String, paging: Paging) -> RequestDescriptor {
    RequestDescriptor::get(path)
        .param("page", paging.page)
        .param("per_page", paging.per_page)
}

fn list_screen(resource: Resource, paging: Paging) -> Result<Screen> {
    let name = resource.as_str();
    Screen::new(
        &format!("/{name}/list.html"),
        paged(format!("/{name}"), paging),
        SwapTarget::with_id(format!("{name}-list")).data_attr(attrs::RENDER, format!("{name}-list")),
    )
}

fn delete_screen(resource: Resource, id: &str, paging: Paging) -> Result<Screen> {
    let name = resource.as_str();
    let list = format!("#{name}-list");
    let alert = SwapTarget::with_id(format!("{name}-alert"))
        .data_attr(attrs::RENDER, "form-status")
        .data_attr(attrs::REFRESH, list.clone())
        .data_attr(
            attrs::REFRESH_ENDPOINT,
            format!("/{name}?page={}&per_page={}", paging.page, paging.per_page),
        );

    let descriptor = RequestDescriptor::new(http::Method::DELETE, format!("/{name}/{id}"));
    let mut screen = Screen::new(&format!("/{name}/list.html"), descriptor, alert)?;
    screen.page.insert_target(
        SwapTarget::with_id(format!("{name}-list")).data_attr(attrs::RENDER, format!("{name}-list")),
    );
    screen.shown.push(list);
    Ok(screen)
}

fn submit_screen(
    verb: &str,
    path: String,
    fields: Vec<(String, String)>,
    redirect: Option<String>,
    reset: bool,
) -> Result<Screen> {
    const FORM: &str = "#form";

    let mut descriptor = RequestDescriptor::from_verb(verb, path)?;
    for (name, raw) in &fields {
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.clone()));
        descriptor = descriptor.param(name.as_str(), value);
    }

    let mut alert = SwapTarget::with_id("form-alert").data_attr(attrs::RENDER, "form-status");
    if let Some(redirect) = redirect {
        alert = alert.data_attr(attrs::REDIRECT, redirect);
    }
    if reset {
        alert = alert.data_attr(attrs::RESET_FORM, "true");
    }

    let mut screen = Screen::new("/form.html", descriptor, alert)?;
    let names: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
    screen.page.insert_form(FORM, &names);
    screen.page.nest_in_form("#form-alert", FORM);
    for (name, raw) in &fields {
        screen.page.set_field(FORM, name, raw);
    }
    screen.form = Some(FORM.to_string());
    Ok(screen)
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_panel_core::KeyValueStore;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("name=Apollo"), Ok(("name".into(), "Apollo".into())));
        assert_eq!(parse_field("q=a=b"), Ok(("q".into(), "a=b".into())));
        assert!(parse_field("=x").is_err());
        assert!(parse_field("novalue").is_err());
    }

    #[test]
    fn test_delete_screen_wires_refresh() {
        let paging = Paging { page: 2, per_page: 5 };
        let screen = delete_screen(Resource::Projects, "7", paging).unwrap();

        assert_eq!(screen.request.target, "#projects-alert");
        assert_eq!(screen.request.descriptor.path, "/projects/7");
        let alert = screen.page.element("#projects-alert").unwrap();
        assert_eq!(alert.data(attrs::REFRESH), Some("#projects-list"));
        assert_eq!(alert.data(attrs::REFRESH_ENDPOINT), Some("/projects?page=2&per_page=5"));
        assert!(screen.page.element("#projects-list").is_some());
    }

    #[test]
    fn test_delete_asks_unless_confirmed() {
        let delete = |yes| Commands::Delete {
            resource: Resource::Users,
            id: "7".into(),
            yes,
            paging: Paging { page: 1, per_page: 10 },
        };

        assert_eq!(delete(false).confirmation().as_deref(), Some("Delete this user?"));
        assert_eq!(delete(true).confirmation(), None);
        assert_eq!(Commands::Users { paging: Paging { page: 1, per_page: 10 } }.confirmation(), None);
    }

    #[test]
    fn test_submit_screen_sends_typed_values() {
        let fields = vec![
            ("title".to_string(), "Ship it".to_string()),
            ("assigned_to".to_string(), "4".to_string()),
        ];
        let screen = submit_screen("post", "/projects/1/tasks".into(), fields, None, true).unwrap();

        let params = &screen.request.descriptor.parameters;
        assert_eq!(params["title"], "Ship it");
        assert_eq!(params["assigned_to"], 4);
        assert_eq!(screen.page.field("#form", "title"), Some("Ship it"));
        assert!(screen.page.element("#logout-btn").is_some());
    }

    #[test]
    fn test_tasks_screen_targets_project_tasks() {
        let command = Commands::Tasks {
            project_id: "3".into(),
            paging: Paging { page: 1, per_page: 10 },
        };
        let screen = command.screen().unwrap();
        let target = screen.page.element("#project-tasks").unwrap();
        assert_eq!(target.data(attrs::PROJECT_ID), Some("3"));
        assert_eq!(screen.request.descriptor.parameters["per_page"], 10);
    }

    #[test]
    fn test_logout_stays_local() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("session.json")).unwrap();
        store.set("pm_token", "abc").unwrap();

        let mut panel = Panel::new(store, &PanelSettings::default());
        let mut page = MemoryPage::new("/users/list.html");
        panel.logout(&mut page).unwrap();

        assert!(!panel.session().is_authenticated());
        assert_eq!(page.navigations().len(), 1);
    }
}
