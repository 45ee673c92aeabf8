//! Error types for the panel pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Standard result type for pipeline operations
pub type PanelResult<T> = std::result::Result<T, PanelError>;

/// Errors raised while preparing requests or loading configuration
///
/// Rendering never fails: malformed payloads fall back to the default swap and
/// missing records are reported in the rendered fragment.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Invalid value for header {name}: {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors raised by [`crate::KeyValueStore`] adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file {path} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
