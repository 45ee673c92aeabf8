//! pm-panel HTTP layer
//!
//! [`client::HttpTransport`] sends prepared requests over `reqwest`;
//! [`client::PanelClient`] drives whole exchanges, refreshes included, on top
//! of any [`client::Transport`].

pub mod client;

pub use client::error::ClientError;
pub use client::{ExchangeReport, ExchangeRequest, HttpTransport, PanelClient, Transport};
