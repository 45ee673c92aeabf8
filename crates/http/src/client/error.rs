//! Client error types

use pm_panel_core::PanelError;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Pipeline error while preparing or completing an exchange
    #[error(transparent)]
    Panel(#[from] PanelError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether the request never produced a response
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}
