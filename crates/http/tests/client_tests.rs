//! Integration tests for the exchange driver over a real HTTP transport

use pm_panel_core::page::attrs;
use pm_panel_core::render::{Localizer, PREFILL_FIELDS};
use pm_panel_core::session::TOKEN_KEY;
use pm_panel_core::{
    MemoryPage, MemoryStore, Panel, PanelSettings, RequestDescriptor, SwapTarget,
};
use pm_panel_http::{ClientError, ExchangeRequest, HttpTransport, PanelClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> PanelClient<MemoryStore, HttpTransport> {
    let settings = PanelSettings {
        api_base: server.uri(),
        ..PanelSettings::default()
    };
    let store = match token {
        Some(token) => MemoryStore::with_entries([(TOKEN_KEY, token)]),
        None => MemoryStore::new(),
    };
    let panel = Panel::new(store, &settings).with_localizer(Localizer::utc());
    PanelClient::new(panel, HttpTransport::from_settings(&settings).unwrap())
}

fn users_page() -> MemoryPage {
    let mut page = MemoryPage::new("/users/list.html");
    page.insert_target(SwapTarget::with_id("users-list").data_attr(attrs::RENDER, "users-list"));
    page.insert_target(
        SwapTarget::with_id("users-alert")
            .data_attr(attrs::RENDER, "form-status")
            .data_attr(attrs::REFRESH, "#users-list")
            .data_attr(attrs::REFRESH_ENDPOINT, "/users?page=1&per_page=10"),
    );
    page
}

#[test]
fn test_transport_builder_rejects_bad_user_agent() {
    let result = HttpTransport::builder().user_agent("bad\nagent").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));

    let result = HttpTransport::builder()
        .user_agent("pm-panel-tests")
        .timeout(Duration::from_secs(5))
        .build();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_login_sends_basic_credentials_and_stores_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("authorization", "Basic YUBiLmNvbTpw"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "token_type": "Bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server, None);
    let mut page = MemoryPage::new("/index.html");
    page.insert_target(SwapTarget::with_id("login-alert").data_attr(attrs::RENDER, "login-feedback"));

    let descriptor = RequestDescriptor::new(http::Method::POST, "/login")
        .param("email", "a@b.com")
        .param("password", "p");
    let report = client
        .exchange(&mut page, ExchangeRequest::new(descriptor, "#login-alert"))
        .await
        .unwrap();

    assert_eq!(report.status, 200);
    assert!(report.swapped);
    assert!(report.completion.token_stored);
    assert_eq!(client.panel().session().token().as_deref(), Some("fresh"));
    assert!(page.content("#login-alert").unwrap().contains("Login successful."));
    assert_eq!(page.navigations()[0].url, "http://localhost:8000/users/list.html");
}

#[tokio::test]
async fn test_failed_login_reports_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .mount(&server)
        .await;

    let mut client = client(&server, None);
    let mut page = MemoryPage::new("/index.html");
    page.insert_target(SwapTarget::with_id("login-alert").data_attr(attrs::RENDER, "login-feedback"));

    let descriptor = RequestDescriptor::new(http::Method::POST, "/login")
        .param("email", "a@b.com")
        .param("password", "wrong");
    let report = client
        .exchange(&mut page, ExchangeRequest::new(descriptor, "#login-alert"))
        .await
        .unwrap();

    assert!(report.swapped);
    assert!(report.completion.forced_logout);
    assert!(page.content("#login-alert").unwrap().contains("alert-danger"));
    assert!(page.navigations().is_empty());
}

#[tokio::test]
async fn test_list_uses_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 11, "name": "Grace", "email": "grace@example.com", "role": "admin"}],
            "meta": {"page": 2, "per_page": 10, "total": 11}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server, Some("T"));
    let mut page = users_page();

    let descriptor = RequestDescriptor::get("/users").param("page", 2).param("per_page", 10);
    let report = client
        .exchange(&mut page, ExchangeRequest::new(descriptor, "#users-list"))
        .await
        .unwrap();

    assert!(report.swapped);
    let html = page.content("#users-list").unwrap();
    assert!(html.contains("Grace"));
    assert!(html.contains("Page 2 of 2"));
}

#[tokio::test]
async fn test_unauthorized_forces_logout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .mount(&server)
        .await;

    let mut client = client(&server, Some("expired"));
    let mut page = MemoryPage::new("/projects/list.html");
    page.insert_target(SwapTarget::with_id("projects-list").data_attr(attrs::RENDER, "projects-list"));

    let report = client
        .exchange(
            &mut page,
            ExchangeRequest::new(RequestDescriptor::get("/projects"), "#projects-list"),
        )
        .await
        .unwrap();

    assert_eq!(report.status, 401);
    assert!(report.completion.forced_logout);
    assert!(!client.panel().session().is_authenticated());
    assert_eq!(page.navigations()[0].url, "http://localhost:8000/index.html");
}

#[tokio::test]
async fn test_delete_refreshes_list() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/3"))
        .and(header("authorization", "Bearer T"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "User deleted."})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 4, "name": "Remaining"}],
            "meta": {"page": 1, "per_page": 10, "total": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server, Some("T"));
    let mut page = users_page();

    let descriptor = RequestDescriptor::new(http::Method::DELETE, "/users/3");
    let report = client
        .exchange(&mut page, ExchangeRequest::new(descriptor, "#users-alert"))
        .await
        .unwrap();

    assert!(report.swapped);
    assert_eq!(report.refreshed, vec!["#users-list".to_string()]);
    assert_eq!(report.dropped_refreshes, 0);
    assert!(page.content("#users-alert").unwrap().contains("User deleted."));
    assert!(page.content("#users-list").unwrap().contains("Remaining"));
}

#[tokio::test]
async fn test_refresh_for_missing_element_is_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "User deleted."})))
        .mount(&server)
        .await;

    let mut client = client(&server, Some("T"));
    let mut page = users_page();
    page.remove("#users-list");

    let descriptor = RequestDescriptor::new(http::Method::DELETE, "/users/3");
    let report = client
        .exchange(&mut page, ExchangeRequest::new(descriptor, "#users-alert"))
        .await
        .unwrap();

    assert!(report.refreshed.is_empty());
    assert_eq!(report.dropped_refreshes, 1);
}

#[tokio::test]
async fn test_create_sends_json_body_and_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Apollo", "description": "Moon"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 9}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server, Some("T"));
    let mut page = MemoryPage::new("/projects/create.html");
    page.insert_target(
        SwapTarget::with_id("project-alert")
            .data_attr(attrs::RENDER, "form-status")
            .data_attr(attrs::REDIRECT, "list.html"),
    );

    let descriptor = RequestDescriptor::new(http::Method::POST, "/projects")
        .param("name", "Apollo")
        .param("description", "Moon");
    let report = client
        .exchange(&mut page, ExchangeRequest::new(descriptor, "#project-alert"))
        .await
        .unwrap();

    assert_eq!(report.status, 201);
    assert!(page.content("#project-alert").unwrap().contains("Saved successfully."));
    assert_eq!(page.navigations()[0].url, "list.html");
    assert_eq!(page.navigations()[0].delay, Duration::from_millis(600));
}

#[tokio::test]
async fn test_validation_errors_are_listed() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/users/2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "validation_error",
            "message": "Invalid request payload.",
            "messages": {"email": ["Not a valid email address."]}
        })))
        .mount(&server)
        .await;

    let mut client = client(&server, Some("T"));
    let mut page = MemoryPage::new("/users/edit.html");
    page.insert_target(
        SwapTarget::with_id("user-alert")
            .data_attr(attrs::RENDER, "form-status")
            .data_attr(attrs::REDIRECT, "list.html"),
    );

    let descriptor = RequestDescriptor::new(http::Method::PUT, "/users/2").param("email", "nope");
    let report = client
        .exchange(&mut page, ExchangeRequest::new(descriptor, "#user-alert"))
        .await
        .unwrap();

    assert!(report.swapped);
    let html = page.content("#user-alert").unwrap();
    assert!(html.contains("<li><strong>email:</strong> Not a valid email address.</li>"));
    assert!(page.navigations().is_empty());
}

#[tokio::test]
async fn test_prefill_task_form() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/3/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 5, "title": "Write docs", "status": "in_progress", "assigned_to": 2, "due_date": "2024-05-01"}]
        })))
        .mount(&server)
        .await;

    let mut client = client(&server, Some("T"));
    let mut page = MemoryPage::new("/tasks/edit.html");
    page.insert_form("#task-form", &PREFILL_FIELDS);
    page.insert_target(
        SwapTarget::with_id("task-loader")
            .data_attr(attrs::RENDER, "task-prefill")
            .data_attr(attrs::TASK_ID, "5")
            .data_attr(attrs::PREFILL_FORM, "#task-form"),
    );

    client
        .exchange(
            &mut page,
            ExchangeRequest::new(RequestDescriptor::get("/projects/3/tasks"), "#task-loader"),
        )
        .await
        .unwrap();

    assert_eq!(page.field("#task-form", "title"), Some("Write docs"));
    assert_eq!(page.field("#task-form", "assigned_to"), Some("2"));
    assert_eq!(page.field("#task-form", "due_date"), Some("2024-05-01"));
    assert!(page.is_hidden("#task-loader"));
}

#[tokio::test]
async fn test_non_json_error_is_not_swapped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
        .mount(&server)
        .await;

    let mut client = client(&server, Some("T"));
    let mut page = users_page();

    let report = client
        .exchange(&mut page, ExchangeRequest::new(RequestDescriptor::get("/users"), "#users-list"))
        .await
        .unwrap();

    assert_eq!(report.status, 502);
    assert!(!report.swapped);
    assert_eq!(page.content("#users-list"), None);
}

#[tokio::test]
async fn test_transport_failure_surfaces() {
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let settings = PanelSettings {
        api_base: format!("http://{closed}"),
        ..PanelSettings::default()
    };
    let store = MemoryStore::with_entries([(TOKEN_KEY, "T")]);
    let mut client = PanelClient::new(
        Panel::new(store, &settings),
        HttpTransport::from_settings(&settings).unwrap(),
    );

    let mut page = users_page();
    let result = client
        .exchange(&mut page, ExchangeRequest::new(RequestDescriptor::get("/users"), "#users-list"))
        .await;

    assert!(matches!(result, Err(ref e) if e.is_transport_failure()));
    assert_eq!(page.content("#users-list"), None);
}
