//! Network transport for prepared requests

use super::error::ClientError;
use async_trait::async_trait;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::Method;
use pm_panel_core::payload::display_value;
use pm_panel_core::{PanelSettings, PreparedRequest, TransportResponse};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Sends one prepared request and returns the raw response
#[async_trait]
pub trait Transport {
    async fn send(&self, request: &PreparedRequest) -> Result<TransportResponse, ClientError>;
}

/// `reqwest` backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport with default configuration
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport configured from panel settings
    pub fn from_settings(settings: &PanelSettings) -> Result<Self, ClientError> {
        let mut builder = Self::builder().user_agent(&settings.user_agent);
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<TransportResponse, ClientError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        if !request.parameters.is_empty() {
            if request.method == Method::GET || request.method == Method::DELETE {
                builder = builder.query(&pairs(request));
            } else if request.sends_json_body() {
                builder = builder.json(&request.parameters);
            } else {
                builder = builder.form(&pairs(request));
            }
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        tracing::debug!(method = %request.method, url = %request.url, status, "Received response");
        Ok(TransportResponse::new(status, content_type, body))
    }
}

fn pairs(request: &PreparedRequest) -> Vec<(&str, String)> {
    request
        .parameters
        .iter()
        .map(|(name, value)| (name.as_str(), display_value(value)))
        .collect()
}

/// Builder for [`HttpTransport`]
#[derive(Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the transport
    pub fn build(self) -> Result<HttpTransport, ClientError> {
        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| PanelSettings::default().user_agent);
        let user_agent = HeaderValue::from_str(&user_agent)
            .map_err(|e| ClientError::Configuration(format!("invalid user agent: {e}")))?;
        client_builder = client_builder.user_agent(user_agent);

        Ok(HttpTransport {
            client: client_builder.build()?,
        })
    }
}
